use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Redirect};
use url::Url;

use crate::{
    server::RelayState,
    spotify::auth::exchange_code,
    success,
    types::TokenResponse,
    warning,
};

/// Completes the authorization-code grant and hands the tokens to the
/// front-end as query parameters.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(relay): Extension<Arc<RelayState>>,
) -> Redirect {
    if let Some(error) = params.get("error") {
        warning!("Spotify denied the login: {}", error);
        return failure_redirect(&relay.config.frontend_uri);
    }

    if let Some(state) = params.get("state") {
        if !relay.take_state(state).await {
            warning!("Callback carried an unknown state");
            return failure_redirect(&relay.config.frontend_uri);
        }
    }

    let Some(code) = params.get("code").filter(|c| !c.is_empty()) else {
        warning!("Callback without authorization code");
        return failure_redirect(&relay.config.frontend_uri);
    };

    match exchange_code(&relay.http, &relay.config, code).await {
        Ok(token) => {
            success!("Token exchange succeeded");
            Redirect::to(&success_location(&relay.config.frontend_uri, &token))
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            failure_redirect(&relay.config.frontend_uri)
        }
    }
}

/// `FRONTEND_URI?access_token=..&refresh_token=..&expires_in=..`
pub fn success_location(frontend_uri: &str, token: &TokenResponse) -> String {
    let expires_in = token.expires_in.to_string();
    let mut pairs = vec![("access_token", token.access_token.as_str())];
    if let Some(refresh) = token.refresh_token.as_deref() {
        pairs.push(("refresh_token", refresh));
    }
    pairs.push(("expires_in", expires_in.as_str()));
    with_query(frontend_uri, &pairs)
}

/// `FRONTEND_URI?error=invalid_token`
pub fn failure_location(frontend_uri: &str) -> String {
    with_query(frontend_uri, &[("error", "invalid_token")])
}

fn failure_redirect(frontend_uri: &str) -> Redirect {
    Redirect::to(&failure_location(frontend_uri))
}

fn with_query(base: &str, pairs: &[(&str, &str)]) -> String {
    match Url::parse(base) {
        Ok(mut url) => {
            url.query_pairs_mut().extend_pairs(pairs);
            url.to_string()
        }
        // relative front-end paths are passed through as given
        Err(_) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish();
            let separator = if base.contains('?') { '&' } else { '?' };
            format!("{}{}{}", base, separator, query)
        }
    }
}
