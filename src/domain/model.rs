use crate::utils::error::{PocketError, Result};
use crate::utils::validation::{validate_credential, validate_non_empty_string, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of remote operations. URLs live in `config::Endpoints`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Authenticate,
    Authorise,
    Retrieve,
    Modify,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Authenticate,
        Endpoint::Authorise,
        Endpoint::Retrieve,
        Endpoint::Modify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Authenticate => "authenticate",
            Endpoint::Authorise => "authorise",
            Endpoint::Retrieve => "retrieve",
            Endpoint::Modify => "modify",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub consumer_key: String,
}

impl Credential {
    pub fn new(consumer_key: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
        }
    }
}

impl Validate for Credential {
    fn validate(&self) -> Result<()> {
        validate_credential("consumer_key", &self.consumer_key)
    }
}

/// Issued by the authenticate step; exchanged exactly once for an `AccessGrant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
    pub code: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub access_token: String,
    pub username: String,
}

/// Consumer key plus access token: what every item-level call carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub consumer_key: String,
    pub access_token: String,
}

impl Session {
    pub fn new(consumer_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_grant(credential: &Credential, grant: &AccessGrant) -> Self {
        Self::new(credential.consumer_key.clone(), grant.access_token.clone())
    }
}

impl Validate for Session {
    fn validate(&self) -> Result<()> {
        validate_credential("consumer_key", &self.consumer_key)?;
        validate_credential("access_token", &self.access_token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Unread,
    Archive,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Video,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Newest,
    Oldest,
    Title,
    Site,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailType {
    Simple,
    Complete,
}

/// Retrieve filters. Every field is passed through to the service untouched;
/// unset fields are left out of the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub consumer_key: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ItemState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(rename = "detailType", default, skip_serializing_if = "Option::is_none")]
    pub detail_type: Option<DetailType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl ItemRequest {
    pub fn new(session: &Session) -> Self {
        Self {
            consumer_key: session.consumer_key.clone(),
            access_token: session.access_token.clone(),
            ..Default::default()
        }
    }
}

impl Validate for ItemRequest {
    fn validate(&self) -> Result<()> {
        validate_credential("consumer_key", &self.consumer_key)?;
        validate_credential("access_token", &self.access_token)
    }
}

/// One saved item. Pocket sends most scalars as strings; fields not modelled
/// here are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: String,
    #[serde(default)]
    pub resolved_id: Option<String>,
    #[serde(default)]
    pub given_url: Option<String>,
    #[serde(default)]
    pub given_title: Option<String>,
    #[serde(default)]
    pub resolved_url: Option<String>,
    #[serde(default)]
    pub resolved_title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub favorite: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub time_added: Option<String>,
    #[serde(default)]
    pub word_count: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Item {
    pub fn title(&self) -> &str {
        [&self.resolved_title, &self.given_title]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|t| !t.is_empty())
            .unwrap_or("(untitled)")
    }

    pub fn url(&self) -> Option<&str> {
        self.resolved_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or(self.given_url.as_deref())
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite.as_deref() == Some("1")
    }

    pub fn is_archived(&self) -> bool {
        self.status.as_deref() == Some("1")
    }

    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.time_added.as_deref()?.parse::<i64>().ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrieveResponse {
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub complete: Option<i32>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub list: BTreeMap<String, Item>,
    #[serde(default)]
    pub since: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemList {
    Map(BTreeMap<String, Item>),
    Seq(Vec<Item>),
}

// An empty list arrives as `[]` rather than `{}`.
fn items_or_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, Item>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ItemList::deserialize(deserializer)? {
        ItemList::Map(map) => map,
        ItemList::Seq(items) => items
            .into_iter()
            .map(|item| (item.item_id.clone(), item))
            .collect(),
    })
}

/// The modify vocabulary. Variants with fields carry the extra parameters that
/// action type needs on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionKind {
    Archive,
    Readd,
    Favorite,
    Unfavorite,
    Delete,
    TagsAdd { tags: String },
    TagsRemove { tags: String },
    TagsReplace { tags: String },
    TagsClear,
    TagRename { old_tag: String, new_tag: String },
}

impl ActionKind {
    pub const NAMES: [&'static str; 10] = [
        "archive",
        "readd",
        "favorite",
        "unfavorite",
        "delete",
        "tags_add",
        "tags_remove",
        "tags_replace",
        "tags_clear",
        "tag_rename",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Archive => "archive",
            ActionKind::Readd => "readd",
            ActionKind::Favorite => "favorite",
            ActionKind::Unfavorite => "unfavorite",
            ActionKind::Delete => "delete",
            ActionKind::TagsAdd { .. } => "tags_add",
            ActionKind::TagsRemove { .. } => "tags_remove",
            ActionKind::TagsReplace { .. } => "tags_replace",
            ActionKind::TagsClear => "tags_clear",
            ActionKind::TagRename { .. } => "tag_rename",
        }
    }

    /// Builds an action from its name and positional arguments, checking the
    /// argument count each action type expects.
    pub fn parse(name: &str, args: &[String]) -> Result<Self> {
        let no_args = |kind: ActionKind| {
            if args.is_empty() {
                Ok(kind)
            } else {
                Err(PocketError::invalid_request(format!(
                    "'{}' takes no arguments, got {}",
                    name,
                    args.len()
                )))
            }
        };

        match name {
            "archive" => no_args(ActionKind::Archive),
            "readd" => no_args(ActionKind::Readd),
            "favorite" => no_args(ActionKind::Favorite),
            "unfavorite" => no_args(ActionKind::Unfavorite),
            "delete" => no_args(ActionKind::Delete),
            "tags_clear" => no_args(ActionKind::TagsClear),
            "tags_add" => Ok(ActionKind::TagsAdd {
                tags: join_tags(name, args)?,
            }),
            "tags_remove" => Ok(ActionKind::TagsRemove {
                tags: join_tags(name, args)?,
            }),
            "tags_replace" => Ok(ActionKind::TagsReplace {
                tags: join_tags(name, args)?,
            }),
            "tag_rename" => match args {
                [old_tag, new_tag] => {
                    validate_non_empty_string("old_tag", old_tag)?;
                    validate_non_empty_string("new_tag", new_tag)?;
                    Ok(ActionKind::TagRename {
                        old_tag: old_tag.trim().to_string(),
                        new_tag: new_tag.trim().to_string(),
                    })
                }
                _ => Err(PocketError::invalid_request(format!(
                    "'tag_rename' takes exactly two arguments (old tag, new tag), got {}",
                    args.len()
                ))),
            },
            other => Err(PocketError::invalid_request(format!(
                "Unsupported action '{}'. Supported actions: {}",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

fn join_tags(name: &str, args: &[String]) -> Result<String> {
    let tags: Vec<&str> = args
        .iter()
        .flat_map(|a| a.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    if tags.is_empty() {
        return Err(PocketError::invalid_request(format!(
            "'{}' needs at least one tag",
            name
        )));
    }
    Ok(tags.join(","))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,
    pub item_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
}

impl Action {
    pub fn new(kind: ActionKind, item_id: i64) -> Self {
        Self {
            kind,
            item_id,
            time: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// An ordered, non-empty batch of actions. The service applies them in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ModifyRequestWire")]
pub struct ModifyRequest {
    pub consumer_key: String,
    pub access_token: String,
    actions: Vec<Action>,
}

#[derive(Deserialize)]
struct ModifyRequestWire {
    consumer_key: String,
    access_token: String,
    actions: Vec<Action>,
}

impl TryFrom<ModifyRequestWire> for ModifyRequest {
    type Error = PocketError;

    fn try_from(wire: ModifyRequestWire) -> Result<Self> {
        ModifyRequest::new(
            &Session::new(wire.consumer_key, wire.access_token),
            wire.actions,
        )
    }
}

impl ModifyRequest {
    pub fn new(session: &Session, actions: Vec<Action>) -> Result<Self> {
        if actions.is_empty() {
            return Err(PocketError::invalid_request(
                "a modify batch needs at least one action",
            ));
        }
        Ok(Self {
            consumer_key: session.consumer_key.clone(),
            access_token: session.access_token.clone(),
            actions,
        })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifyResponse {
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub action_results: Vec<serde_json::Value>,
    #[serde(default)]
    pub action_errors: Option<Vec<serde_json::Value>>,
}

impl ModifyResponse {
    /// `false` and `null` mark a failed action; anything else (usually `true`)
    /// is success.
    pub fn action_succeeded(&self, index: usize) -> bool {
        !matches!(
            self.action_results.get(index),
            None | Some(serde_json::Value::Bool(false)) | Some(serde_json::Value::Null)
        )
    }

    pub fn action_error(&self, index: usize) -> Option<String> {
        let err = self.action_errors.as_ref()?.get(index)?;
        match err {
            serde_json::Value::Null => None,
            serde_json::Value::Object(obj) => obj
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .or_else(|| Some(err.to_string())),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub action: String,
    pub item_id: i64,
    pub succeeded: bool,
    pub error: Option<String>,
}

/// Per-action results of a batch, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyOutcome {
    pub status: i32,
    pub outcomes: Vec<ActionOutcome>,
}

impl ModifyOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.status == 1 && self.outcomes.iter().all(|o| o.succeeded)
    }
}
