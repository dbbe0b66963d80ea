// Health check endpoint handler implementation

/// Handler for GET /health - Returns a simple health check response to verify the API is running
pub async fn health_check() -> &'static str {
    "OK"
}
