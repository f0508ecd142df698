//! GraphQL endpoint and GraphiQL explorer.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::response::Html;

use crate::middleware::Session;
use crate::state::AppState;

/// Path the schema is served on.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Execute a GraphQL request on behalf of the bearer token's principal.
pub async fn graphql_handler(
    State(state): State<AppState>,
    Session(principal): Session,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let Some(principal) = principal {
        request = request.data(principal);
    }
    state.schema().execute(request).await.into()
}

/// Serve the GraphiQL explorer.
pub async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}
