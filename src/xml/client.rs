//! Legacy XML API client

use super::parser::{as_list, escape, text_of, xml_to_json};
use super::types::{UserInfo, UserRole, XmlAction};
use crate::config::QuickBaseOptions;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig, RequestConfig};
use crate::types::Method;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Header naming the legacy action
pub const ACTION_HEADER: &str = "QUICKBASE-ACTION";

/// dbid for actions that are not scoped to an app or table
pub const MAIN_DBID: &str = "main";

/// Client for `https://{realm}.quickbase.com/db/{dbid}`
///
/// Shares [`QuickBaseOptions`] with the JSON client: the user and app
/// tokens, `xml_timeout_ms` and `read_only` apply here.
#[derive(Debug)]
pub struct XmlClient {
    options: QuickBaseOptions,
    http: HttpClient,
    udata: Option<String>,
}

impl XmlClient {
    /// Create a client for the realm in `options`
    pub fn new(options: QuickBaseOptions) -> Result<Self> {
        let base_url = format!("https://{}/db/", options.realm_hostname());
        Self::with_base_url(options, &base_url)
    }

    /// Create a client against a different host, e.g. a local mock
    pub fn with_base_url(options: QuickBaseOptions, base_url: &str) -> Result<Self> {
        options.validate()?;

        let config = HttpClientConfig::builder()
            .base_url(base_url)
            .timeout(options.xml_timeout())
            .rate_limit(RateLimiterConfig::new(
                options.connection_limit,
                Duration::from_millis(options.connection_limit_period_ms),
            ))
            .error_on_rate_limit(options.error_on_connection_limit)
            .retry_on_quota_exceeded(options.retry_on_quota_exceeded)
            .user_agent(options.user_agent_string())
            .debug(options.debug)
            .build()?;

        Ok(Self {
            http: HttpClient::with_config(config)?,
            options,
            udata: None,
        })
    }

    /// Echo `udata` in every request envelope
    pub fn with_udata(mut self, udata: impl Into<String>) -> Self {
        self.udata = Some(udata.into());
        self
    }

    /// Options the client was built with
    pub fn options(&self) -> &QuickBaseOptions {
        &self.options
    }

    /// Whether write actions are refused
    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    /// Send one action and return the raw response text
    ///
    /// `body` is an XML fragment placed inside the `<qdbapi>` envelope next
    /// to the credentials. In read-only mode write actions fail with
    /// `Error::ReadOnly` before anything is sent.
    pub async fn execute(&self, dbid: &str, action: XmlAction, body: &str) -> Result<String> {
        if self.options.read_only && action.is_write() {
            return Err(Error::ReadOnly {
                action: action.to_string(),
            });
        }

        let url = self.http.endpoint(&[dbid])?;
        let mut request = RequestConfig::new()
            .header(ACTION_HEADER, action.as_str())
            .header("Content-Type", "application/xml")
            .text(self.envelope(body))
            .timeout(self.options.xml_timeout());
        if let Some(token) = &self.options.user_token {
            request = request.header("Authorization", format!("QB-USER-TOKEN {token}"));
        }

        debug!("Executing {} against {}", action, dbid);
        self.http.request_text(Method::POST, url, request).await
    }

    /// Send one action and parse the response, failing on a non-zero errcode
    pub async fn call(&self, dbid: &str, action: XmlAction, body: &str) -> Result<Value> {
        let text = self.execute(dbid, action, body).await?;
        let response = xml_to_json(&text)?;
        check_errcode(action, response)
    }

    fn envelope(&self, body: &str) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" ?><qdbapi>");
        if let Some(token) = &self.options.user_token {
            xml.push_str(&element("usertoken", token));
        }
        if let Some(token) = &self.options.app_token {
            xml.push_str(&element("apptoken", token));
        }
        if let Some(udata) = &self.udata {
            xml.push_str(&element("udata", udata));
        }
        xml.push_str(body);
        xml.push_str("</qdbapi>");
        xml
    }

    // ========================================================================
    // Typed actions
    // ========================================================================

    /// Number of records matching a query
    pub async fn do_query_count(&self, dbid: &str, query: &str) -> Result<u64> {
        let response = self
            .call(dbid, XmlAction::DoQueryCount, &element("query", query))
            .await?;
        number(&response, XmlAction::DoQueryCount, "numMatches")
    }

    /// Number of records in a table
    pub async fn get_num_records(&self, dbid: &str) -> Result<u64> {
        let response = self.call(dbid, XmlAction::GetNumRecords, "").await?;
        number(&response, XmlAction::GetNumRecords, "num_records")
    }

    /// Value of an application variable (empty when unset)
    pub async fn get_db_var(&self, dbid: &str, name: &str) -> Result<String> {
        let response = self
            .call(dbid, XmlAction::GetDbVar, &element("varname", name))
            .await?;
        Ok(field(&response, "value"))
    }

    /// Set an application variable
    pub async fn set_db_var(&self, dbid: &str, name: &str, value: &str) -> Result<()> {
        let body = format!("{}{}", element("varname", name), element("value", value));
        self.call(dbid, XmlAction::SetDbVar, &body).await?;
        Ok(())
    }

    /// Look up a user by email, or the caller when `email` is `None`
    pub async fn get_user_info(&self, email: Option<&str>) -> Result<UserInfo> {
        let body = email.map(|e| element("email", e)).unwrap_or_default();
        let response = self
            .call(MAIN_DBID, XmlAction::GetUserInfo, &body)
            .await?;
        let user = response
            .get("user")
            .ok_or_else(|| Error::xml_parse("API_GetUserInfo response has no <user>"))?;

        Ok(UserInfo {
            id: attr(user, "id"),
            first_name: field(user, "firstName"),
            last_name: field(user, "lastName"),
            login: field(user, "login"),
            email: field(user, "email"),
            screen_name: field(user, "screenName"),
        })
    }

    /// Roles a user holds in an app, optionally including group membership
    pub async fn get_user_role(
        &self,
        dbid: &str,
        user_id: &str,
        include_groups: bool,
    ) -> Result<Vec<UserRole>> {
        let mut body = element("userid", user_id);
        if include_groups {
            body.push_str(&element("inclgrps", "1"));
        }
        let response = self.call(dbid, XmlAction::GetUserRole, &body).await?;

        let roles = response
            .get("user")
            .and_then(|user| user.get("roles"))
            .and_then(|roles| roles.get("role"));

        Ok(as_list(roles)
            .into_iter()
            .map(|role| {
                let access = role.get("access");
                UserRole {
                    id: attr(role, "id").parse().unwrap_or_default(),
                    name: field(role, "name"),
                    access_id: access.and_then(|a| attr(a, "id").parse().ok()),
                    access: access.and_then(text_of).unwrap_or_default().to_string(),
                    member_type: role
                        .get("member")
                        .and_then(|m| m.get("@type"))
                        .and_then(Value::as_str)
                        .map(String::from),
                }
            })
            .collect())
    }

    /// Grant a role to a user
    pub async fn add_user_to_role(&self, dbid: &str, user_id: &str, role_id: u64) -> Result<()> {
        let body = format!(
            "{}{}",
            element("userid", user_id),
            element("roleid", &role_id.to_string())
        );
        self.call(dbid, XmlAction::AddUserToRole, &body).await?;
        Ok(())
    }

    /// Revoke a role from a user
    pub async fn remove_user_from_role(
        &self,
        dbid: &str,
        user_id: &str,
        role_id: u64,
    ) -> Result<()> {
        let body = format!(
            "{}{}",
            element("userid", user_id),
            element("roleid", &role_id.to_string())
        );
        self.call(dbid, XmlAction::RemoveUserFromRole, &body).await?;
        Ok(())
    }

    /// Schema of an app or table, as the converted `<table>` element
    pub async fn get_schema(&self, dbid: &str) -> Result<Value> {
        let mut response = self.call(dbid, XmlAction::GetSchema, "").await?;
        response
            .get_mut("table")
            .map(Value::take)
            .ok_or_else(|| Error::xml_parse("API_GetSchema response has no <table>"))
    }

    /// Invalidate the ticket cookie for the session
    pub async fn sign_out(&self) -> Result<()> {
        self.call(MAIN_DBID, XmlAction::SignOut, "").await?;
        Ok(())
    }
}

/// `<name>escaped value</name>`
fn element(name: &str, value: &str) -> String {
    format!("<{name}>{}</{name}>", escape(value))
}

fn field(value: &Value, name: &str) -> String {
    value
        .get(name)
        .and_then(text_of)
        .unwrap_or_default()
        .to_string()
}

fn attr(value: &Value, name: &str) -> String {
    value
        .get(format!("@{name}"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn number(response: &Value, action: XmlAction, name: &str) -> Result<u64> {
    let text = field(response, name);
    text.trim().parse().map_err(|_| {
        Error::xml_parse(format!("{action} response has no numeric <{name}>: '{text}'"))
    })
}

/// Map a non-zero `errcode` to `Error::XmlApi`
fn check_errcode(action: XmlAction, response: Value) -> Result<Value> {
    let code = match response.get("errcode").and_then(text_of) {
        Some(code) => code
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::xml_parse(format!("{action} returned errcode '{code}'")))?,
        None => 0,
    };

    if code != 0 {
        let detail = field(&response, "errdetail");
        let text = if detail.is_empty() {
            field(&response, "errtext")
        } else {
            detail
        };
        return Err(Error::XmlApi {
            action: action.to_string(),
            code,
            text,
        });
    }

    Ok(response)
}
