//! Legacy action names and typed results

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! xml_actions {
    ($($variant:ident => $name:literal, $write:literal;)*) => {
        /// Legacy XML API action, sent in the `QUICKBASE-ACTION` header
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum XmlAction {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl XmlAction {
            /// Every known action
            pub const ALL: &'static [XmlAction] = &[$(XmlAction::$variant),*];

            /// Wire name
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(XmlAction::$variant => $name,)*
                }
            }

            /// Whether the action modifies data; these are refused in read-only mode
            pub const fn is_write(self) -> bool {
                match self {
                    $(XmlAction::$variant => $write,)*
                }
            }
        }
    };
}

xml_actions! {
    AddGroupToRole => "API_AddGroupToRole", true;
    AddUserToGroup => "API_AddUserToGroup", true;
    AddUserToRole => "API_AddUserToRole", true;
    ChangeGroupInfo => "API_ChangeGroupInfo", true;
    ChangeUserRole => "API_ChangeUserRole", true;
    CopyGroup => "API_CopyGroup", true;
    CreateGroup => "API_CreateGroup", true;
    DeleteGroup => "API_DeleteGroup", true;
    DoQueryCount => "API_DoQueryCount", false;
    FieldAddChoices => "API_FieldAddChoices", true;
    FieldRemoveChoices => "API_FieldRemoveChoices", true;
    GetAncestorInfo => "API_GetAncestorInfo", false;
    GetAppDtmInfo => "API_GetAppDTMInfo", false;
    GetDbInfo => "API_GetDBInfo", false;
    GetDbVar => "API_GetDBVar", false;
    GetGroupRole => "API_GetGroupRole", false;
    GetNumRecords => "API_GetNumRecords", false;
    GetRoleInfo => "API_GetRoleInfo", false;
    GetSchema => "API_GetSchema", false;
    GetUserInfo => "API_GetUserInfo", false;
    GetUserRole => "API_GetUserRole", false;
    GetUsersInGroup => "API_GetUsersInGroup", false;
    GrantedDbs => "API_GrantedDBs", false;
    GrantedDbsForGroup => "API_GrantedDBsForGroup", false;
    GrantedGroups => "API_GrantedGroups", false;
    ProvisionUser => "API_ProvisionUser", true;
    RemoveGroupFromRole => "API_RemoveGroupFromRole", true;
    RemoveUserFromGroup => "API_RemoveUserFromGroup", true;
    RemoveUserFromRole => "API_RemoveUserFromRole", true;
    SendInvitation => "API_SendInvitation", true;
    SetDbVar => "API_SetDBVar", true;
    SetKeyField => "API_SetKeyField", true;
    SignOut => "API_SignOut", false;
    UserRoles => "API_UserRoles", false;
}

impl fmt::Display for XmlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for XmlAction {
    type Err = Error;

    /// Accepts `API_GetSchema` as well as `GetSchema`, ignoring case
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.strip_prefix("API_").unwrap_or(s);
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.as_str()[4..].eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::unknown_operation(s))
    }
}

/// Result of `API_GetUserInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub login: String,
    pub email: String,
    pub screen_name: String,
}

/// One role from `API_GetUserRole`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub id: u64,
    pub name: String,
    pub access_id: Option<u64>,
    pub access: String,
    /// `user` or `group` when group membership was requested
    pub member_type: Option<String>,
}
