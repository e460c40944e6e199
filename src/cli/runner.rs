//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::QuickBase;
use crate::config::QuickBaseOptions;
use crate::error::{Error, Result};
use crate::ops::Operation;
use crate::value::QbValue;
use crate::xml::{xml_to_json, XmlAction, XmlClient};
use futures::StreamExt;
use serde_json::{json, Value};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Ops => {
                self.list_operations();
                Ok(())
            }
            Commands::Call {
                name,
                params,
                all,
                pages,
                max_pages,
            } => self.call(name, params, *all, *pages, *max_pages).await,
            Commands::Token { dbid } => self.token(dbid).await,
            Commands::Xml {
                dbid,
                action,
                body,
                raw,
            } => self.xml(dbid, action, body, *raw).await,
        }
    }

    /// Load client options from `--config` or the environment
    fn load_options(&self) -> Result<QuickBaseOptions> {
        let mut options = match &self.cli.config {
            Some(path) => QuickBaseOptions::from_file(path)?,
            None => QuickBaseOptions::from_env()?,
        };
        if self.cli.verbose {
            options.debug = true;
        }
        Ok(options)
    }

    /// List registry operations
    fn list_operations(&self) {
        let operations: Vec<Value> = Operation::ALL
            .iter()
            .map(|op| {
                let def = op.def();
                json!({
                    "name": def.name,
                    "method": def.method.as_str(),
                    "path": def.path,
                    "paginated": def.pagination.is_paginated()
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "OPERATIONS",
            "operations": operations
        }));
    }

    /// Invoke one operation
    async fn call(
        &self,
        name: &str,
        params: &str,
        all: bool,
        pages: bool,
        max_pages: Option<usize>,
    ) -> Result<()> {
        let params = parse_params(params)?;
        let client = QuickBase::new(self.load_options()?)?;

        let mut call = client.call_by_name(name, params)?;
        if let Some(max) = max_pages {
            call = call.max_pages(max);
        }

        if pages {
            let mut stream = Box::pin(call.pages());
            while let Some(page) = stream.next().await {
                self.output_message(&page?.to_json());
            }
            return Ok(());
        }

        let result = if all { call.all().await? } else { call.await? };
        self.output_message(&result.to_json());
        Ok(())
    }

    /// Fetch a temporary token
    async fn token(&self, dbid: &str) -> Result<()> {
        let mut options = self.load_options()?;
        options.use_temp_tokens = true;
        let client = QuickBase::new(options)?;

        let token = client.temp_token(dbid).await?;
        self.output_message(&json!({
            "type": "TEMP_TOKEN",
            "dbid": dbid,
            "temporaryAuthorization": token
        }));
        Ok(())
    }

    /// Run a legacy action
    async fn xml(&self, dbid: &str, action: &str, body: &str, raw: bool) -> Result<()> {
        let action: XmlAction = action.parse()?;
        let client = XmlClient::new(self.load_options()?)?;

        let text = client.execute(dbid, action, body).await?;
        if raw {
            println!("{text}");
            return Ok(());
        }
        self.output_message(&xml_to_json(&text)?);
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Parse `--params`, which must be a JSON object or array
fn parse_params(params: &str) -> Result<QbValue> {
    let value: Value = serde_json::from_str(params)?;
    if !(value.is_object() || value.is_array()) {
        return Err(Error::config("--params must be a JSON object or array"));
    }
    Ok(QbValue::from(value))
}
