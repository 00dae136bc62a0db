//! Central authorization policy: an ordered rule table evaluated before any
//! handler runs. First match wins; no match means deny.

use axum::{
  extract::{Request, State},
  http::Method,
  middleware::Next,
  response::{IntoResponse, Response},
};

use parley_core::store::{MessageStore, PersonStore};

use crate::{AppState, auth::Principal, error::ApiError};

/// What a matched rule requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  Anonymous,
  Authenticated,
  Admin,
}

struct Rule {
  pattern: String,
  /// `None` matches any method.
  method:  Option<Method>,
  access:  Access,
}

/// Ordered rule table; evaluated top to bottom, first match wins.
pub struct Policy {
  rules: Vec<Rule>,
}

impl Policy {
  /// The standard parley rule set, anchored at the configured base path:
  ///
  /// | pattern | method | access |
  /// |---|---|---|
  /// | `{base}/public/**` | any | anonymous |
  /// | `{base}/admin/upgrade-role` | PUT | authenticated (self-service) |
  /// | `{base}/admin/**` | any | admin |
  /// | `/**` | any | authenticated |
  pub fn standard(base: &str) -> Self {
    let base = base.trim_end_matches('/');
    Self {
      rules: vec![
        Rule {
          pattern: format!("{base}/public/**"),
          method:  None,
          access:  Access::Anonymous,
        },
        // The self-service role upgrade must be reachable by BASE users,
        // so it gets a rule ahead of the admin catch-all.
        Rule {
          pattern: format!("{base}/admin/upgrade-role"),
          method:  Some(Method::PUT),
          access:  Access::Authenticated,
        },
        Rule {
          pattern: format!("{base}/admin/**"),
          method:  None,
          access:  Access::Admin,
        },
        Rule { pattern: "/**".to_owned(), method: None, access: Access::Authenticated },
      ],
    }
  }

  fn requirement(&self, method: &Method, path: &str) -> Option<Access> {
    self
      .rules
      .iter()
      .find(|rule| {
        rule.method.as_ref().is_none_or(|m| m == method)
          && pattern_matches(&rule.pattern, path)
      })
      .map(|rule| rule.access)
  }

  /// Evaluate the table for one request. 401 when authentication is missing,
  /// 403 when the caller is authenticated but lacks the required role.
  pub fn check(
    &self,
    method: &Method,
    path: &str,
    principal: Option<&Principal>,
  ) -> Result<(), ApiError> {
    let required = self.requirement(method, path);
    match (required, principal) {
      (Some(Access::Anonymous), _) => Ok(()),
      (Some(Access::Authenticated), Some(_)) => Ok(()),
      (Some(Access::Admin), Some(p)) if p.is_admin() => Ok(()),
      (Some(Access::Admin), Some(p)) => Err(ApiError::Forbidden(format!(
        "role {} is not allowed to access this resource",
        p.authority()
      ))),
      // Default deny and unauthenticated both end here.
      (_, None) => {
        Err(ApiError::Unauthorized("authentication is required".to_owned()))
      }
      (None, Some(_)) => {
        Err(ApiError::Forbidden("access denied".to_owned()))
      }
    }
  }
}

/// `**` matches any suffix (including none); everything else is literal.
fn pattern_matches(pattern: &str, path: &str) -> bool {
  if let Some(prefix) = pattern.strip_suffix("/**") {
    return path == prefix || path.starts_with(&format!("{prefix}/"));
  }
  pattern == path
}

/// Middleware layer enforcing the policy after authentication has run.
pub async fn enforce<S>(
  State(state): State<AppState<S>>,
  request: Request,
  next: Next,
) -> Response
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  let principal = request.extensions().get::<Principal>();
  match state.policy.check(request.method(), request.uri().path(), principal) {
    Ok(()) => next.run(request).await,
    Err(e) => e.into_response(),
  }
}
