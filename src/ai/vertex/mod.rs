pub mod auth;
pub mod client;
pub mod edit;
pub mod imagen;
pub mod types;
pub mod video;
pub mod vision;

pub use auth::{ServiceAccountTokenSource, StaticTokenSource, TokenSource};
pub use client::VertexHttpClient;
pub use edit::VertexImageEditClient;
pub use imagen::VertexImagenClient;
pub use video::VertexVideoClient;
pub use vision::VertexVisionClient;

#[cfg(test)]
pub(crate) mod test_support {
    use super::{StaticTokenSource, VertexHttpClient};
    use std::sync::Arc;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockBuilder, MockServer};

    pub const GENERATE_CONTENT_PATH_REGEX: &str =
        r"^/v1/projects/[^/]+/locations/[^/]+/publishers/google/models/[^/:]+:generateContent$";
    pub const PREDICT_PATH_REGEX: &str =
        r"^/v1/projects/[^/]+/locations/[^/]+/publishers/google/models/[^/:]+:predict$";
    pub const PREDICT_LONG_RUNNING_PATH_REGEX: &str =
        r"^/v1/projects/[^/]+/locations/[^/]+/publishers/google/models/[^/:]+:predictLongRunning$";
    pub const FETCH_OPERATION_PATH_REGEX: &str =
        r"^/v1/projects/[^/]+/locations/[^/]+/publishers/google/models/[^/:]+:fetchPredictOperation$";

    pub fn post_path_regex(regex: &str) -> MockBuilder {
        Mock::given(method("POST")).and(path_regex(regex))
    }

    pub fn http_client(server: &MockServer) -> Arc<VertexHttpClient> {
        Arc::new(
            VertexHttpClient::new(
                Arc::new(StaticTokenSource::new("test-token")),
                "test-project".to_string(),
                "us-central1".to_string(),
            )
            .with_base_url(server.uri()),
        )
    }
}
