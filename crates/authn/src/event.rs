//! Webhook event types and structural decoding.
//!
//! A webhook body has the shape:
//!
//! ```json
//! {
//!   "event": {
//!     "id": "5158957497384960",
//!     "created": "2020-10-26T17:41:23.123456+00:00",
//!     "isDelivered": false,
//!     "subscription": "transfer",
//!     "workspaceId": "6341320293482496",
//!     "log": { "id": "...", "created": "...", "type": "success", "errors": [], "transfer": { } }
//!   }
//! }
//! ```
//!
//! Decoding here is structural only: it establishes that the payload is a
//! well-formed event, never that it is authentic. Authentication is done by
//! [`EventParser`](crate::EventParser), which is the only place an [`Event`]
//! is handed to callers.
//!
//! The `log` object is dispatched through a [`LogRegistry`] keyed by the
//! `subscription` string. Subscriptions without a registered decoder decode
//! to [`EventLog::Unknown`] rather than failing.

use std::{collections::HashMap, fmt, sync::Arc};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AuthError, Result};

/// An authenticated webhook event.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event identifier.
    pub id: String,
    /// When the remote service created the event.
    pub created: DateTime<Utc>,
    /// Whether the remote service already delivered this event successfully.
    pub is_delivered: bool,
    /// Subscription kind that produced the event (e.g. `"transfer"`).
    pub subscription: String,
    /// Workspace the event belongs to, when the payload carries one.
    pub workspace_id: Option<String>,
    /// Typed log entry describing the resource change.
    pub log: EventLog,
}

/// A resource log entry: what happened to which resource.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceLog {
    /// Log identifier.
    pub id: String,
    /// When the log entry was created.
    pub created: DateTime<Utc>,
    /// Log type (e.g. `"created"`, `"success"`, `"failed"`).
    pub kind: String,
    /// Error messages attached to the log entry.
    pub errors: Vec<String>,
    /// The resource object the log refers to.
    pub resource: Value,
}

/// Event log, one variant per subscription kind.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum EventLog {
    /// `transfer` subscription.
    Transfer(ResourceLog),
    /// `boleto` subscription.
    Boleto(ResourceLog),
    /// `boleto-payment` subscription.
    BoletoPayment(ResourceLog),
    /// `utility-payment` subscription.
    UtilityPayment(ResourceLog),
    /// `brcode-payment` subscription.
    BrcodePayment(ResourceLog),
    /// `tax-payment` subscription.
    TaxPayment(ResourceLog),
    /// `darf-payment` subscription.
    DarfPayment(ResourceLog),
    /// `boleto-holmes` subscription.
    BoletoHolmes(ResourceLog),
    /// `invoice` subscription.
    Invoice(ResourceLog),
    /// `deposit` subscription.
    Deposit(ResourceLog),
    /// Subscription decoded by a caller-registered resource decoder.
    Custom {
        /// Subscription string.
        subscription: String,
        /// Decoded log entry.
        log: ResourceLog,
    },
    /// Subscription with no registered decoder; the raw log is preserved.
    Unknown {
        /// Subscription string.
        subscription: String,
        /// Raw `log` object.
        log: Value,
    },
}

impl EventLog {
    /// Returns the resource log for every variant except [`EventLog::Unknown`].
    #[must_use]
    pub fn resource_log(&self) -> Option<&ResourceLog> {
        match self {
            Self::Transfer(log)
            | Self::Boleto(log)
            | Self::BoletoPayment(log)
            | Self::UtilityPayment(log)
            | Self::BrcodePayment(log)
            | Self::TaxPayment(log)
            | Self::DarfPayment(log)
            | Self::BoletoHolmes(log)
            | Self::Invoice(log)
            | Self::Deposit(log)
            | Self::Custom { log, .. } => Some(log),
            Self::Unknown { .. } => None,
        }
    }
}

/// Decodes a raw `log` object into an [`EventLog`].
pub type LogDecoder = Arc<dyn Fn(Value) -> Result<EventLog> + Send + Sync>;

/// Built-in subscriptions: (subscription, resource field, variant).
const BUILT_IN: &[(&str, &str, fn(ResourceLog) -> EventLog)] = &[
    ("transfer", "transfer", EventLog::Transfer),
    ("boleto", "boleto", EventLog::Boleto),
    ("boleto-payment", "payment", EventLog::BoletoPayment),
    ("utility-payment", "payment", EventLog::UtilityPayment),
    ("brcode-payment", "payment", EventLog::BrcodePayment),
    ("tax-payment", "payment", EventLog::TaxPayment),
    ("darf-payment", "payment", EventLog::DarfPayment),
    ("boleto-holmes", "holmes", EventLog::BoletoHolmes),
    ("invoice", "invoice", EventLog::Invoice),
    ("deposit", "deposit", EventLog::Deposit),
];

/// Maps subscription strings to log decoders.
///
/// [`LogRegistry::default`] knows every built-in subscription. Resource
/// modules outside this crate add their own with [`register`](Self::register)
/// or [`register_resource`](Self::register_resource).
///
/// # Examples
///
/// ```
/// use ledger_webhook_authn::event::{EventLog, LogRegistry};
///
/// let mut registry = LogRegistry::default();
/// registry.register_resource("corporate-card", "card");
/// assert!(registry.contains("corporate-card"));
/// assert!(registry.contains("transfer"));
/// ```
#[derive(Clone)]
pub struct LogRegistry {
    decoders: HashMap<String, LogDecoder>,
}

impl LogRegistry {
    /// Creates a registry with no decoders; every log decodes to
    /// [`EventLog::Unknown`].
    #[must_use]
    pub fn empty() -> Self {
        Self { decoders: HashMap::new() }
    }

    /// Registers `decoder` for `subscription`, replacing any previous one.
    pub fn register<F>(&mut self, subscription: impl Into<String>, decoder: F)
    where
        F: Fn(Value) -> Result<EventLog> + Send + Sync + 'static,
    {
        self.decoders.insert(subscription.into(), Arc::new(decoder));
    }

    /// Registers a subscription whose log carries its resource under `field`.
    ///
    /// Logs decode to [`EventLog::Custom`].
    pub fn register_resource(&mut self, subscription: impl Into<String>, field: &'static str) {
        let subscription = subscription.into();
        let name = subscription.clone();
        self.register(subscription, move |log| {
            let log = decode_resource_log(log, field)?;
            Ok(EventLog::Custom { subscription: name.clone(), log })
        });
    }

    /// Returns `true` if a decoder is registered for `subscription`.
    #[must_use]
    pub fn contains(&self, subscription: &str) -> bool {
        self.decoders.contains_key(subscription)
    }

    /// Decodes `log` with the decoder registered for `subscription`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Decode`] if a registered decoder rejects the log.
    pub fn decode(&self, subscription: &str, log: Value) -> Result<EventLog> {
        match self.decoders.get(subscription) {
            Some(decoder) => decoder(log),
            None => {
                tracing::debug!(subscription, "no log decoder registered");
                Ok(EventLog::Unknown { subscription: subscription.to_owned(), log })
            },
        }
    }
}

impl Default for LogRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for &(subscription, field, variant) in BUILT_IN {
            registry
                .register(subscription, move |log| decode_resource_log(log, field).map(variant));
        }
        registry
    }
}

impl fmt::Debug for LogRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut subscriptions: Vec<_> = self.decoders.keys().collect();
        subscriptions.sort();
        f.debug_struct("LogRegistry").field("subscriptions", &subscriptions).finish()
    }
}

#[derive(Deserialize)]
struct Envelope {
    event: RawEvent,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    id: String,
    created: DateTime<Utc>,
    is_delivered: bool,
    subscription: String,
    #[serde(default)]
    workspace_id: Option<String>,
    log: Value,
}

#[derive(Deserialize)]
struct RawLog {
    id: String,
    created: DateTime<Utc>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    errors: Option<Vec<String>>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Decodes a log object whose resource lives under `field`.
///
/// # Errors
///
/// Returns [`AuthError::Decode`] if the log misses `id`, `created`, `type`,
/// or the resource field.
pub fn decode_resource_log(log: Value, field: &str) -> Result<ResourceLog> {
    let mut raw: RawLog = serde_json::from_value(log)
        .map_err(|e| AuthError::decode_with_source("event log could not be decoded", e))?;

    let resource = raw
        .rest
        .remove(field)
        .ok_or_else(|| AuthError::decode(format!("event log is missing `{field}`")))?;

    Ok(ResourceLog {
        id: raw.id,
        created: raw.created,
        kind: raw.kind,
        errors: raw.errors.unwrap_or_default(),
        resource,
    })
}

/// Structurally decodes a webhook body into a candidate [`Event`].
///
/// This does not authenticate the payload.
///
/// # Errors
///
/// Returns [`AuthError::Decode`] if `content` is not JSON, lacks the `event`
/// object or any required field, or if the log decoder rejects the log.
pub fn decode_event(content: &str, registry: &LogRegistry) -> Result<Event> {
    let envelope: Envelope = serde_json::from_str(content)
        .map_err(|e| AuthError::decode_with_source("event payload could not be decoded", e))?;
    let raw = envelope.event;

    let log = registry.decode(&raw.subscription, raw.log)?;

    Ok(Event {
        id: raw.id,
        created: raw.created,
        is_delivered: raw.is_delivered,
        subscription: raw.subscription,
        workspace_id: raw.workspace_id,
        log,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn payload(subscription: &str, log: Value) -> String {
        json!({
            "event": {
                "id": "5158957497384960",
                "created": "2020-10-26T17:41:23.123456+00:00",
                "isDelivered": true,
                "subscription": subscription,
                "workspaceId": "6341320293482496",
                "log": log,
            }
        })
        .to_string()
    }

    fn log_with(field: &str) -> Value {
        let mut log = json!({
            "id": "6028014399012864",
            "created": "2020-10-26T17:41:22.917123+00:00",
            "type": "success",
            "errors": [],
        });
        log[field] = json!({ "id": "4933140435468288", "amount": 100 });
        log
    }

    #[test]
    fn test_decode_transfer_event() {
        let content = payload("transfer", log_with("transfer"));
        let event = decode_event(&content, &LogRegistry::default()).expect("decode");

        assert_eq!(event.id, "5158957497384960");
        assert!(event.is_delivered);
        assert_eq!(event.subscription, "transfer");
        assert_eq!(event.workspace_id.as_deref(), Some("6341320293482496"));

        let EventLog::Transfer(log) = &event.log else {
            panic!("expected transfer log, got {:?}", event.log);
        };
        assert_eq!(log.kind, "success");
        assert_eq!(log.resource["amount"], 100);
    }

    #[rstest]
    #[case::boleto("boleto", "boleto")]
    #[case::boleto_payment("boleto-payment", "payment")]
    #[case::utility_payment("utility-payment", "payment")]
    #[case::brcode_payment("brcode-payment", "payment")]
    #[case::tax_payment("tax-payment", "payment")]
    #[case::darf_payment("darf-payment", "payment")]
    #[case::boleto_holmes("boleto-holmes", "holmes")]
    #[case::invoice("invoice", "invoice")]
    #[case::deposit("deposit", "deposit")]
    fn test_built_in_subscriptions(#[case] subscription: &str, #[case] field: &str) {
        let event = decode_event(&payload(subscription, log_with(field)), &LogRegistry::default())
            .expect("decode");

        let log = event.log.resource_log().expect("typed log");
        assert_eq!(log.resource["id"], "4933140435468288");
        assert!(!matches!(event.log, EventLog::Unknown { .. } | EventLog::Custom { .. }));
    }

    #[test]
    fn test_unknown_subscription_preserved() {
        let raw_log = json!({ "anything": [1, 2, 3] });
        let event = decode_event(&payload("brand-new", raw_log.clone()), &LogRegistry::default())
            .expect("decode");

        assert_eq!(
            event.log,
            EventLog::Unknown { subscription: "brand-new".to_owned(), log: raw_log }
        );
        assert!(event.log.resource_log().is_none());
    }

    #[test]
    fn test_registered_resource_decodes_to_custom() {
        let mut registry = LogRegistry::default();
        registry.register_resource("corporate-card", "card");

        let event =
            decode_event(&payload("corporate-card", log_with("card")), &registry).expect("decode");

        let EventLog::Custom { subscription, log } = &event.log else {
            panic!("expected custom log, got {:?}", event.log);
        };
        assert_eq!(subscription, "corporate-card");
        assert_eq!(log.resource["amount"], 100);
    }

    #[test]
    fn test_null_errors_decoded_as_empty() {
        let mut log = log_with("transfer");
        log["errors"] = Value::Null;

        let event =
            decode_event(&payload("transfer", log), &LogRegistry::default()).expect("decode");

        let log = event.log.resource_log().expect("typed log");
        assert!(log.errors.is_empty());
    }

    #[test]
    fn test_absent_errors_decoded_as_empty() {
        let mut log = log_with("transfer");
        log.as_object_mut().expect("object").remove("errors");

        let event =
            decode_event(&payload("transfer", log), &LogRegistry::default()).expect("decode");

        assert!(event.log.resource_log().expect("typed log").errors.is_empty());
    }

    #[test]
    fn test_log_errors_preserved() {
        let mut log = log_with("transfer");
        log["errors"] = json!(["insufficient balance"]);

        let event =
            decode_event(&payload("transfer", log), &LogRegistry::default()).expect("decode");
        assert_eq!(
            event.log.resource_log().expect("typed log").errors,
            ["insufficient balance"]
        );
    }

    #[test]
    fn test_empty_registry_decodes_everything_as_unknown() {
        let event = decode_event(&payload("transfer", log_with("transfer")), &LogRegistry::empty())
            .expect("decode");
        assert!(matches!(event.log, EventLog::Unknown { .. }));
    }

    #[test]
    fn test_missing_workspace_id_allowed() {
        let content = json!({
            "event": {
                "id": "1",
                "created": "2020-10-26T17:41:23+00:00",
                "isDelivered": false,
                "subscription": "transfer",
                "log": log_with("transfer"),
            }
        })
        .to_string();

        let event = decode_event(&content, &LogRegistry::default()).expect("decode");
        assert!(event.workspace_id.is_none());
        assert!(!event.is_delivered);
    }

    #[test]
    fn test_known_subscription_missing_resource_rejected() {
        let result =
            decode_event(&payload("transfer", log_with("boleto")), &LogRegistry::default());
        assert!(
            matches!(
                &result,
                Err(AuthError::Decode { message, .. }) if message.contains("transfer")
            ),
            "got: {result:?}"
        );
    }

    #[rstest]
    #[case::not_json("this is not json")]
    #[case::empty("")]
    #[case::no_event_wrapper(r#"{"id":"1"}"#)]
    #[case::missing_is_delivered(
        r#"{"event":{"id":"1","created":"2020-10-26T17:41:23+00:00","subscription":"x","log":{}}}"#
    )]
    #[case::bad_timestamp(
        r#"{"event":{"id":"1","created":"yesterday","isDelivered":true,
            "subscription":"x","log":{}}}"#
    )]
    fn test_malformed_payload_rejected(#[case] content: &str) {
        let result = decode_event(content, &LogRegistry::default());
        assert!(matches!(result, Err(AuthError::Decode { .. })), "got: {result:?}");
    }

    #[test]
    fn test_registry_debug_lists_subscriptions() {
        let debug = format!("{:?}", LogRegistry::default());
        assert!(debug.contains("boleto-payment"));
        assert!(debug.contains("transfer"));
    }
}
