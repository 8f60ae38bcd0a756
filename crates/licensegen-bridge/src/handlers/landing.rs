//! Landing page handler.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use crate::state::AppState;

/// Render the signup landing page.
///
/// The page exposes the two publishable configuration values to the
/// client-side script that collects a card token during signup and stores
/// it in the new user's metadata. No side effects.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let page = format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <title>Sign up</title>
    <script src="https://js.stripe.com/v3/"></script>
    <script>
      window.STRIPE_PUBLISHABLE_KEY = "{publishable_key}";
      window.LICENSEGEN_ACCOUNT_ID = "{account_id}";
    </script>
  </head>
  <body>
    <h1>Create your account</h1>
    <form id="signup-form">
      <input type="email" name="email" placeholder="Email" required>
      <div id="card-element"></div>
      <button type="submit">Sign up</button>
    </form>
  </body>
</html>
"#,
        publishable_key = state.config.stripe_publishable_key,
        account_id = state.config.licensegen_account_id,
    );

    Html(page)
}
