//! Top-level client: the public tracking surface.

use crate::builder::EventBuilder;
use crate::consumer::Consumer;
use crate::error::Result;
use crate::event::{EventType, Properties};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Main interface for submitting analytics data.
///
/// A client wraps one [`Consumer`] and owns the session-scoped super
/// properties. All tracking operations validate and normalize their input
/// before anything touches the network, and block the caller until the
/// consumer has accepted (and, for unbuffered consumers, transmitted) the
/// record.
///
/// ```no_run
/// use sensors_analytics_sdk::consumer::DefaultConsumer;
/// use sensors_analytics_sdk::event::Properties;
/// use sensors_analytics_sdk::SensorsAnalytics;
/// use std::sync::Arc;
///
/// # async fn run() -> sensors_analytics_sdk::Result<()> {
/// let consumer = DefaultConsumer::new("http://sa_host.com:8006/sa?token=xxx");
/// let sa = SensorsAnalytics::new(Arc::new(consumer));
///
/// sa.track("abcdefg", "ServerStart", Properties::new().with("sex", "female")).await?;
/// # Ok(())
/// # }
/// ```
pub struct SensorsAnalytics {
    consumer: Arc<dyn Consumer>,
    super_properties: RwLock<Properties>,
}

impl SensorsAnalytics {
    /// Create a client delivering through the given consumer.
    pub fn new(consumer: Arc<dyn Consumer>) -> Self {
        let client = Self {
            consumer,
            super_properties: RwLock::new(Properties::new()),
        };
        client.clear_super_properties();
        client
    }

    /// Register properties merged into every track-family event. Caller
    /// properties win over super properties on key collision.
    pub fn register_super_properties(&self, properties: Properties) {
        self.super_properties.write().unwrap().extend(properties);
    }

    /// Drop all registered super properties, keeping the library identity
    /// fields.
    pub fn clear_super_properties(&self) {
        *self.super_properties.write().unwrap() = Properties::new()
            .with("$lib", crate::LIB_NAME)
            .with("$lib_version", crate::VERSION);
    }

    /// Record a behavioral event for `distinct_id`.
    pub async fn track(
        &self,
        distinct_id: impl Into<String>,
        event_name: impl Into<String>,
        properties: Properties,
    ) -> Result<()> {
        let event = EventBuilder::new(EventType::Track, distinct_id)
            .event_name(event_name)
            .properties(properties)
            .super_properties(self.super_properties())
            .build()?;
        self.consumer.send(event).await
    }

    /// Record a signup, linking the registered `distinct_id` to the
    /// pre-signup `origin_distinct_id`.
    pub async fn track_signup(
        &self,
        distinct_id: impl Into<String>,
        origin_distinct_id: impl Into<String>,
        properties: Properties,
    ) -> Result<()> {
        let event = EventBuilder::new(EventType::TrackSignup, distinct_id)
            .origin_distinct_id(origin_distinct_id)
            .properties(properties)
            .super_properties(self.super_properties())
            .build()?;
        self.consumer.send(event).await
    }

    /// Set profile attributes, overwriting existing values.
    pub async fn profile_set(
        &self,
        distinct_id: impl Into<String>,
        properties: Properties,
    ) -> Result<()> {
        self.profile_event(EventType::ProfileSet, distinct_id, properties).await
    }

    /// Set profile attributes only where no value exists yet.
    pub async fn profile_set_once(
        &self,
        distinct_id: impl Into<String>,
        properties: Properties,
    ) -> Result<()> {
        self.profile_event(EventType::ProfileSetOnce, distinct_id, properties).await
    }

    /// Add integer deltas to numeric profile attributes.
    pub async fn profile_increment(
        &self,
        distinct_id: impl Into<String>,
        properties: Properties,
    ) -> Result<()> {
        self.profile_event(EventType::ProfileIncrement, distinct_id, properties).await
    }

    /// Append strings to list-valued profile attributes.
    pub async fn profile_append(
        &self,
        distinct_id: impl Into<String>,
        properties: Properties,
    ) -> Result<()> {
        self.profile_event(EventType::ProfileAppend, distinct_id, properties).await
    }

    /// Delete the named profile attributes.
    pub async fn profile_unset(
        &self,
        distinct_id: impl Into<String>,
        keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<()> {
        let mut properties = Properties::new();
        for key in keys {
            properties.insert(key, true);
        }
        self.profile_event(EventType::ProfileUnset, distinct_id, properties).await
    }

    /// Transmit anything the consumer still has buffered.
    pub async fn flush(&self) -> Result<()> {
        self.consumer.flush().await
    }

    async fn profile_event(
        &self,
        kind: EventType,
        distinct_id: impl Into<String>,
        properties: Properties,
    ) -> Result<()> {
        let event = EventBuilder::new(kind, distinct_id)
            .properties(properties)
            .super_properties(self.super_properties())
            .build()?;
        debug!("submitting {:?} record", event.kind);
        self.consumer.send(event).await
    }

    fn super_properties(&self) -> Properties {
        self.super_properties.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SensorsAnalyticsError;
    use crate::event::{Event, PropertyValue};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Captures everything a client submits.
    struct CapturingConsumer {
        events: Mutex<Vec<Event>>,
        flushes: Mutex<usize>,
    }

    impl CapturingConsumer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
                flushes: Mutex::new(0),
            })
        }

        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Consumer for CapturingConsumer {
        async fn send(&self, event: Event) -> crate::error::Result<()> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }

        async fn flush(&self) -> crate::error::Result<()> {
            *self.flushes.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn client_with_capture() -> (SensorsAnalytics, Arc<CapturingConsumer>) {
        let consumer = CapturingConsumer::new();
        (SensorsAnalytics::new(consumer.clone()), consumer)
    }

    #[tokio::test]
    async fn test_track_submits_event() {
        let (sa, consumer) = client_with_capture();

        sa.track("abcdefg", "DemoStart", Properties::new().with("sex", "male").with("age", 123))
            .await
            .unwrap();

        let events = consumer.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventType::Track);
        assert_eq!(events[0].event.as_deref(), Some("DemoStart"));
        assert_eq!(events[0].properties.get("sex"), Some(&PropertyValue::String("male".into())));
        assert_eq!(events[0].properties.get("age"), Some(&PropertyValue::Int(123)));
        // Library identity super properties ride along on track events.
        assert_eq!(
            events[0].properties.get("$lib"),
            Some(&PropertyValue::String("Rust".into()))
        );
    }

    #[tokio::test]
    async fn test_track_rejects_reserved_property_key() {
        let (sa, consumer) = client_with_capture();

        let result = sa.track("abcdefg", "DemoStart", Properties::new().with("id", "123")).await;

        assert!(matches!(result, Err(SensorsAnalyticsError::IllegalData(_))));
        assert!(consumer.events().is_empty());
    }

    #[tokio::test]
    async fn test_track_rejects_empty_distinct_id() {
        let (sa, consumer) = client_with_capture();

        let result = sa.track("", "DemoStart", Properties::new()).await;

        assert!(matches!(result, Err(SensorsAnalyticsError::IllegalData(_))));
        assert!(consumer.events().is_empty());
    }

    #[tokio::test]
    async fn test_track_rejects_reserved_event_name() {
        let (sa, _) = client_with_capture();

        let result = sa.track("abcdefg", "event", Properties::new()).await;

        assert!(matches!(result, Err(SensorsAnalyticsError::IllegalData(_))));
    }

    #[tokio::test]
    async fn test_track_signup_links_ids() {
        let (sa, consumer) = client_with_capture();

        sa.track_signup("registered", "anonymous", Properties::new()).await.unwrap();

        let events = consumer.events();
        assert_eq!(events[0].kind, EventType::TrackSignup);
        assert_eq!(events[0].distinct_id, "registered");
        assert_eq!(events[0].original_id.as_deref(), Some("anonymous"));
        assert_eq!(events[0].event.as_deref(), Some("$SignUp"));
    }

    #[tokio::test]
    async fn test_profile_operations_submit_expected_kinds() {
        let (sa, consumer) = client_with_capture();

        sa.profile_set("u", Properties::new().with("sex", "male")).await.unwrap();
        sa.profile_set_once("u", Properties::new().with("sex", "female")).await.unwrap();
        sa.profile_increment("u", Properties::new().with("age", 10)).await.unwrap();
        sa.profile_append("u", Properties::new().with("songs", vec!["aaa", "bbb"])).await.unwrap();

        let kinds: Vec<EventType> = consumer.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventType::ProfileSet,
                EventType::ProfileSetOnce,
                EventType::ProfileIncrement,
                EventType::ProfileAppend,
            ]
        );
    }

    #[tokio::test]
    async fn test_profile_increment_rejects_non_integer() {
        let (sa, consumer) = client_with_capture();

        let result = sa.profile_increment("u", Properties::new().with("age", "10")).await;

        assert!(matches!(result, Err(SensorsAnalyticsError::IllegalData(_))));
        assert!(consumer.events().is_empty());
    }

    #[tokio::test]
    async fn test_profile_append_rejects_non_list() {
        let (sa, _) = client_with_capture();

        let result = sa.profile_append("u", Properties::new().with("songs", "aaa")).await;

        assert!(matches!(result, Err(SensorsAnalyticsError::IllegalData(_))));
    }

    #[tokio::test]
    async fn test_profile_unset_sends_true_markers() {
        let (sa, consumer) = client_with_capture();

        sa.profile_unset("u", ["songs", "sex"]).await.unwrap();

        let events = consumer.events();
        assert_eq!(events[0].kind, EventType::ProfileUnset);
        assert_eq!(events[0].properties.get("songs"), Some(&PropertyValue::Bool(true)));
        assert_eq!(events[0].properties.get("sex"), Some(&PropertyValue::Bool(true)));
    }

    #[tokio::test]
    async fn test_profile_unset_validates_keys() {
        let (sa, _) = client_with_capture();

        let result = sa.profile_unset("u", ["id"]).await;

        assert!(matches!(result, Err(SensorsAnalyticsError::IllegalData(_))));
    }

    #[tokio::test]
    async fn test_register_super_properties_merges_into_track() {
        let (sa, consumer) = client_with_capture();

        sa.register_super_properties(Properties::new().with("channel", "organic").with("age", 1));
        sa.track("abcdefg", "DemoStart", Properties::new().with("age", 123)).await.unwrap();

        let events = consumer.events();
        assert_eq!(
            events[0].properties.get("channel"),
            Some(&PropertyValue::String("organic".into()))
        );
        assert_eq!(events[0].properties.get("age"), Some(&PropertyValue::Int(123)));
    }

    #[tokio::test]
    async fn test_super_properties_skipped_for_profile_ops() {
        let (sa, consumer) = client_with_capture();

        sa.register_super_properties(Properties::new().with("channel", "organic"));
        sa.profile_set("u", Properties::new().with("sex", "male")).await.unwrap();

        assert!(!consumer.events()[0].properties.contains_key("channel"));
    }

    #[tokio::test]
    async fn test_clear_super_properties_resets_to_identity() {
        let (sa, consumer) = client_with_capture();

        sa.register_super_properties(Properties::new().with("channel", "organic"));
        sa.clear_super_properties();
        sa.track("abcdefg", "DemoStart", Properties::new()).await.unwrap();

        let events = consumer.events();
        assert!(!events[0].properties.contains_key("channel"));
        assert_eq!(
            events[0].properties.get("$lib"),
            Some(&PropertyValue::String("Rust".into()))
        );
        assert_eq!(
            events[0].properties.get("$lib_version"),
            Some(&PropertyValue::String(crate::VERSION.into()))
        );
    }

    #[tokio::test]
    async fn test_app_version_super_property_reaches_lib_metadata() {
        let (sa, consumer) = client_with_capture();

        sa.register_super_properties(Properties::new().with("$app_version", "2.4.1"));
        sa.track("abcdefg", "DemoStart", Properties::new()).await.unwrap();

        assert_eq!(
            consumer.events()[0].lib.app_version,
            Some(PropertyValue::String("2.4.1".into()))
        );
    }

    #[tokio::test]
    async fn test_flush_delegates_to_consumer() {
        let (sa, consumer) = client_with_capture();

        sa.flush().await.unwrap();

        assert_eq!(*consumer.flushes.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_track_against_accepting_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/sa")
            .match_body(mockito::Matcher::Regex("data_list=.+&gzip=1|gzip=1&data_list=.+".into()))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let consumer = crate::consumer::DefaultConsumer::new(format!("{}/sa", server.url()));
        let sa = SensorsAnalytics::new(Arc::new(consumer));

        sa.track("abcdefg", "DemoStart", Properties::new().with("sex", "male").with("age", 123))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_end_to_end_track_surfaces_server_rejection() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/sa").with_status(500).with_body("import failed").create_async().await;

        let consumer = crate::consumer::DefaultConsumer::new(format!("{}/sa", server.url()));
        let sa = SensorsAnalytics::new(Arc::new(consumer));

        let result = sa.track("abcdefg", "DemoStart", Properties::new()).await;

        assert!(matches!(result, Err(SensorsAnalyticsError::Server { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_end_to_end_validation_failure_never_reaches_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/sa").with_status(200).expect(0).create_async().await;

        let consumer = crate::consumer::DefaultConsumer::new(format!("{}/sa", server.url()));
        let sa = SensorsAnalytics::new(Arc::new(consumer));

        let result = sa.track("abcdefg", "DemoStart", Properties::new().with("id", "123")).await;

        assert!(matches!(result, Err(SensorsAnalyticsError::IllegalData(_))));
        mock.assert_async().await;
    }
}
