//! The operation table
//!
//! Every JSON API operation is one row below. The `operations!` macro turns
//! the table into the `Operation` enum, its static definitions, name lookup
//! and one method per operation on [`QuickBase`].

use super::types::{BodyKind, OperationDef, ResponseKind};
use crate::client::{PendingCall, QuickBase};
use crate::error::{Error, Result};
use crate::pagination::{Pagination, SkipTarget};
use crate::types::Method;
use crate::value::QbValue;
use std::fmt;
use std::str::FromStr;

macro_rules! pages {
    () => {
        Pagination::None
    };
    ($pagination:expr) => {
        $pagination
    };
}

macro_rules! operations {
    ($(
        $(#[doc = $doc:literal])*
        $variant:ident, $fn_name:ident, $name:literal: $method:ident $path:literal,
            query [$($query:literal),*], body $body:ident, response $response:ident
            $(, pages $pagination:expr)?;
    )+) => {
        /// A JSON API operation
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $(
                $(#[doc = $doc])*
                $variant,
            )+
        }

        impl Operation {
            /// Every operation, in table order
            pub const ALL: &'static [Operation] = &[$(Operation::$variant),+];

            /// Static definition of this operation
            pub fn def(self) -> &'static OperationDef {
                match self {
                    $(
                        Operation::$variant => {
                            const DEF: OperationDef = OperationDef {
                                name: $name,
                                fn_name: stringify!($fn_name),
                                method: Method::$method,
                                path: $path,
                                query: &[$($query),*],
                                body: BodyKind::$body,
                                response: ResponseKind::$response,
                                pagination: pages!($($pagination)?),
                            };
                            &DEF
                        }
                    )+
                }
            }

            /// Look up an operation by wire name (`getApp`) or method name
            /// (`get_app`)
            #[allow(unreachable_patterns)]
            pub fn from_name(name: &str) -> Result<Self> {
                match name {
                    $($name | stringify!($fn_name) => Ok(Operation::$variant),)+
                    _ => Err(Error::unknown_operation(name)),
                }
            }
        }

        impl QuickBase {
            $(
                $(#[doc = $doc])*
                pub fn $fn_name(&self, params: impl Into<QbValue>) -> PendingCall<'_> {
                    self.call(Operation::$variant, params)
                }
            )+
        }
    };
}

operations! {
    // Apps
    /// Create an app
    CreateApp, create_app, "createApp": POST "/apps",
        query [], body Json, response Json;
    /// Get an app's properties
    GetApp, get_app, "getApp": GET "/apps/{appId}",
        query [], body None, response Json;
    /// Update an app's name, description or variables
    UpdateApp, update_app, "updateApp": POST "/apps/{appId}",
        query [], body Json, response Json;
    /// Delete an app (the body repeats the app name)
    DeleteApp, delete_app, "deleteApp": DELETE "/apps/{appId}",
        query [], body Json, response Json;
    /// List events (automations, webhooks) defined in an app
    GetAppEvents, get_app_events, "getAppEvents": GET "/apps/{appId}/events",
        query [], body None, response Json;
    /// Copy an app
    CopyApp, copy_app, "copyApp": POST "/apps/{appId}/copy",
        query [], body Json, response Json;

    // Tables
    /// Create a table in an app
    CreateTable, create_table, "createTable": POST "/tables",
        query ["appId"], body Json, response Json;
    /// List the tables of an app
    GetAppTables, get_app_tables, "getAppTables": GET "/tables",
        query ["appId"], body None, response Json;
    /// Get a table's properties
    GetTable, get_table, "getTable": GET "/tables/{tableId}",
        query ["appId"], body None, response Json;
    /// Update a table's properties
    UpdateTable, update_table, "updateTable": POST "/tables/{tableId}",
        query ["appId"], body Json, response Json;
    /// Delete a table
    DeleteTable, delete_table, "deleteTable": DELETE "/tables/{tableId}",
        query ["appId"], body None, response Json;

    // Relationships
    /// List relationships where the table is the child
    GetRelationships, get_relationships, "getRelationships": GET "/tables/{childTableId}/relationships",
        query ["skip"], body None, response Json,
        pages Pagination::Skip {
            target: SkipTarget::Query,
            records: "relationships",
            count: "numRelationships",
            total: "totalRelationships",
        };
    /// Create a relationship
    CreateRelationship, create_relationship, "createRelationship": POST "/tables/{childTableId}/relationship",
        query [], body Json, response Json;
    /// Update a relationship's lookup and summary fields
    UpdateRelationship, update_relationship, "updateRelationship": POST "/tables/{childTableId}/relationship/{relationshipId}",
        query [], body Json, response Json;
    /// Delete a relationship
    DeleteRelationship, delete_relationship, "deleteRelationship": DELETE "/tables/{childTableId}/relationship/{relationshipId}",
        query [], body None, response Json;

    // Reports
    /// List a table's reports
    GetTableReports, get_table_reports, "getTableReports": GET "/reports",
        query ["tableId"], body None, response Json;
    /// Get a report's definition
    GetReport, get_report, "getReport": GET "/reports/{reportId}",
        query ["tableId"], body None, response Json;
    /// Run a report
    RunReport, run_report, "runReport": POST "/reports/{reportId}/run",
        query ["tableId", "skip", "top"], body None, response Json,
        pages Pagination::skip(SkipTarget::Query);

    // Fields
    /// List a table's fields
    GetFields, get_fields, "getFields": GET "/fields",
        query ["tableId", "includeFieldPerms"], body None, response Json;
    /// Create a field
    CreateField, create_field, "createField": POST "/fields",
        query ["tableId"], body Json, response Json;
    /// Delete fields by id
    DeleteFields, delete_fields, "deleteFields": DELETE "/fields",
        query ["tableId"], body Json, response Json;
    /// Get a field's properties
    GetField, get_field, "getField": GET "/fields/{fieldId}",
        query ["tableId", "includeFieldPerms"], body None, response Json;
    /// Update a field's properties
    UpdateField, update_field, "updateField": POST "/fields/{fieldId}",
        query ["tableId"], body Json, response Json;
    /// Usage statistics for every field of a table
    ///
    /// Single page: the response is a bare array with no totals, so `skip`
    /// and `top` are passed through for the caller to page by hand.
    GetFieldsUsage, get_fields_usage, "getFieldsUsage": GET "/fields/usage",
        query ["tableId", "skip", "top"], body None, response Json;
    /// Usage statistics for one field
    GetFieldUsage, get_field_usage, "getFieldUsage": GET "/fields/usage/{fieldId}",
        query ["tableId"], body None, response Json;

    // Formulas
    /// Evaluate a formula against a record
    RunFormula, run_formula, "runFormula": POST "/formula/run",
        query [], body Json, response Json;

    // Records
    /// Insert or update records
    Upsert, upsert, "upsert": POST "/records",
        query [], body Json, response Json;
    /// Delete records matching a query
    DeleteRecords, delete_records, "deleteRecords": DELETE "/records",
        query [], body Json, response Json;
    /// Query records
    RunQuery, run_query, "runQuery": POST "/records/query",
        query [], body Json, response Json,
        pages Pagination::skip(SkipTarget::BodyOptions);

    // Auth
    /// Get a temporary token for an app or table
    GetTempTokenDbid, get_temp_token_dbid, "getTempTokenDBID": GET "/auth/temporary/{dbid}",
        query [], body None, response Json;
    /// Exchange an SSO token for a QuickBase token
    ExchangeSsoToken, exchange_sso_token, "exchangeSsoToken": POST "/auth/oauth/token",
        query [], body Json, response Json;
    /// Clone the calling user token
    CloneUserToken, clone_user_token, "cloneUserToken": POST "/usertoken/clone",
        query [], body Json, response Json;
    /// Transfer a user token to another user
    TransferUserToken, transfer_user_token, "transferUserToken": POST "/usertoken/transfer",
        query [], body Json, response Json;
    /// Deactivate the calling user token
    DeactivateUserToken, deactivate_user_token, "deactivateUserToken": POST "/usertoken/deactivate",
        query [], body None, response Json;
    /// Delete the calling user token
    DeleteUserToken, delete_user_token, "deleteUserToken": DELETE "/usertoken",
        query [], body None, response Json;

    // Files
    /// Download a file attachment; the response is base64 text
    DownloadFile, download_file, "downloadFile": GET "/files/{tableId}/{recordId}/{fieldId}/{versionNumber}",
        query [], body None, response Text;
    /// Delete one version of a file attachment
    DeleteFile, delete_file, "deleteFile": DELETE "/files/{tableId}/{recordId}/{fieldId}/{versionNumber}",
        query [], body None, response Json;

    // Users
    /// List users of an account
    GetUsers, get_users, "getUsers": POST "/users",
        query ["accountId"], body Json, response Json,
        pages Pagination::token("nextPageToken", "users");
    /// Deny users access to the realm
    DenyUsers, deny_users, "denyUsers": PUT "/users/deny",
        query ["accountId"], body Json, response Json;
    /// Deny users and optionally remove them from groups
    DenyUsersAndGroups, deny_users_and_groups, "denyUsersAndGroups": PUT "/users/deny/{shouldDeleteFromGroups}",
        query ["accountId"], body Json, response Json;
    /// Restore access for denied users
    UndenyUsers, undeny_users, "undenyUsers": PUT "/users/undeny",
        query ["accountId"], body Json, response Json;

    // Groups
    /// Add users to a group
    AddMembersToGroup, add_members_to_group, "addMembersToGroup": POST "/groups/{gid}/members",
        query [], body Json, response Json;
    /// Remove users from a group
    RemoveMembersFromGroup, remove_members_from_group, "removeMembersFromGroup": DELETE "/groups/{gid}/members",
        query [], body Json, response Json;
    /// Add managers to a group
    AddManagersToGroup, add_managers_to_group, "addManagersToGroup": POST "/groups/{gid}/managers",
        query [], body Json, response Json;
    /// Remove managers from a group
    RemoveManagersFromGroup, remove_managers_from_group, "removeManagersFromGroup": DELETE "/groups/{gid}/managers",
        query [], body Json, response Json;
    /// Add child groups to a group
    AddSubgroupsToGroup, add_subgroups_to_group, "addSubgroupsToGroup": POST "/groups/{gid}/subgroups",
        query [], body Json, response Json;
    /// Remove child groups from a group
    RemoveSubgroupsFromGroup, remove_subgroups_from_group, "removeSubgroupsFromGroup": DELETE "/groups/{gid}/subgroups",
        query [], body Json, response Json;

    // Audit
    /// Query the realm audit log
    Audit, audit, "audit": POST "/audit",
        query [], body Json, response Json,
        pages Pagination::token("nextToken", "events");

    // Analytics
    /// Read counts for a day
    PlatformAnalyticReads, platform_analytic_reads, "platformAnalyticReads": GET "/analytics/reads",
        query ["day"], body None, response Json;
    /// Event summaries for an account
    PlatformAnalyticEventSummaries, platform_analytic_event_summaries, "platformAnalyticEventSummaries": POST "/analytics/events/summaries",
        query ["accountId"], body Json, response Json,
        pages Pagination::token("nextToken", "results");

    // Solutions
    /// Export a solution as QBL
    ExportSolution, export_solution, "exportSolution": GET "/solutions/{solutionId}",
        query [], body None, response Text;
    /// Update a solution from QBL
    UpdateSolution, update_solution, "updateSolution": PUT "/solutions/{solutionId}",
        query [], body Text, response Json;
    /// Create a solution from QBL
    CreateSolution, create_solution, "createSolution": POST "/solutions",
        query [], body Text, response Json;
    /// Export a solution's QBL into a record
    ExportSolutionToRecords, export_solution_to_records, "exportSolutionToRecords": GET "/solutions/{solutionId}/torecord",
        query ["tableId"], body None, response Json;
    /// Create a solution from QBL stored in a record
    CreateSolutionFromRecord, create_solution_from_record, "createSolutionFromRecord": GET "/solutions/fromrecord",
        query ["tableId", "recordId"], body None, response Json;
    /// Update a solution from QBL stored in a record
    UpdateSolutionToRecord, update_solution_to_record, "updateSolutionToRecord": GET "/solutions/{solutionId}/fromrecord",
        query ["tableId", "recordId"], body None, response Json;
    /// Preview the changes a QBL update would make
    ChangesetSolution, changeset_solution, "changesetSolution": PUT "/solutions/{solutionId}/changeset",
        query [], body Text, response Json;
    /// Preview the changes QBL stored in a record would make
    ChangesetSolutionFromRecord, changeset_solution_from_record, "changesetSolutionFromRecord": GET "/solutions/{solutionId}/changeset/fromrecord",
        query ["tableId", "recordId"], body None, response Json;

    // Document templates
    /// Render a document template for a record
    GenerateDocument, generate_document, "generateDocument": GET "/docTemplates/{templateId}/generate",
        query [
            "tableId", "recordId", "filename", "format", "margin", "unit", "pageSize",
            "orientation", "realm"
        ], body None, response Json;

    // Trustees
    /// List an app's trustees
    GetTrustees, get_trustees, "getTrustees": GET "/app/{appId}/trustees",
        query [], body None, response Json;
    /// Add trustees to an app
    AddTrustees, add_trustees, "addTrustees": POST "/app/{appId}/trustees",
        query [], body Json, response Json;
    /// Remove trustees from an app
    RemoveTrustees, remove_trustees, "removeTrustees": DELETE "/app/{appId}/trustees",
        query [], body Json, response Json;
    /// Change trustee roles
    UpdateTrustees, update_trustees, "updateTrustees": PATCH "/app/{appId}/trustees",
        query [], body Json, response Json;
}

impl Operation {
    /// Wire name
    pub fn name(self) -> &'static str {
        self.def().name
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}
