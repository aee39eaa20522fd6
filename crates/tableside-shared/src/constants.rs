/// Application name
pub const APP_NAME: &str = "Tableside";

/// Default GraphQL HTTP endpoint (queries and mutations)
pub const DEFAULT_API_ENDPOINT: &str = "http://127.0.0.1:8080/graphql";

/// Path suffix appended to the API endpoint when no stream endpoint is configured
pub const STREAM_PATH_SUFFIX: &str = "/stream";

/// Default per-request timeout for queries and mutations, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Request header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// MIME type expected on the subscription stream
pub const EVENT_STREAM_MIME: &str = "text/event-stream";

/// Stream event name announcing a newly created restaurant
pub const RESTAURANT_CREATED_EVENT: &str = "restaurantCreated";

/// Capacity of the feed notification channel
pub const FEED_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the session command and transition channels
pub const COMMAND_CHANNEL_CAPACITY: usize = 64;
