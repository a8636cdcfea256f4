//! Role guard: route-level minimum-role requirements.
//!
//! A requirement is plain data attached when the router is built, either to a group of routes
//! or to a single route; a route-level requirement replaces the group's. Routes without any
//! requirement are not wrapped.
//!
//! ```ignore
//! RoleGuard::group(Role::Admin)
//!     .route_requiring("/admin/user", post(create_user), Role::SuperAdmin)
//!     .route("/admin/user/{user_id}/role", put(update_user_role))
//!     .into_router()
//! ```
//!
//! The guard reads the `IdentityCtx` left by the authentication gate. No context, or a role below
//! the requirement, is a 403 and the handler never runs.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::api::extractors::IdentityCtx;
use crate::error::AppError;
use crate::model::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRequirement {
    role: Role,
}

impl RoleRequirement {
    pub const fn new(role: Role) -> Self {
        Self { role }
    }

    /// Route-level wins over group-level; neither means no requirement.
    pub fn resolve(route: Option<Role>, group: Option<Role>) -> Option<Self> {
        route.or(group).map(Self::new)
    }

    pub fn is_met_by(&self, identity: Option<&IdentityCtx>) -> bool {
        identity.is_some_and(|ctx| ctx.role.has_permission_level(self.role))
    }
}

/// Wrap every handler currently registered on `method_router` with `requirement`.
pub fn guard<S>(method_router: MethodRouter<S>, requirement: RoleRequirement) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    method_router.route_layer(middleware::from_fn_with_state(requirement, authorize))
}

async fn authorize(
    State(requirement): State<RoleRequirement>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = req.extensions().get::<IdentityCtx>();

    if !requirement.is_met_by(identity) {
        match identity {
            Some(ctx) => tracing::warn!(
                subject_id = %ctx.subject_id,
                role = %ctx.role,
                required_role = %requirement.role,
                path = %req.uri().path(),
                "access denied: insufficient role"
            ),
            None => tracing::warn!(
                required_role = %requirement.role,
                path = %req.uri().path(),
                "access denied: no identity on request"
            ),
        }
        return Err(AppError::Forbidden);
    }

    Ok(next.run(req).await)
}

/// Router builder carrying an optional group-level requirement.
pub struct RoleGuard<S = ()> {
    router: Router<S>,
    group: Option<Role>,
}

impl<S> RoleGuard<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// No group requirement: only routes added with [`RoleGuard::route_requiring`] are guarded.
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            group: None,
        }
    }

    pub fn group(role: Role) -> Self {
        Self {
            router: Router::new(),
            group: Some(role),
        }
    }

    /// Add a route under the group requirement (if any).
    pub fn route(self, path: &str, method_router: MethodRouter<S>) -> Self {
        self.add(path, method_router, None)
    }

    /// Add a route with its own requirement, replacing the group's.
    pub fn route_requiring(self, path: &str, method_router: MethodRouter<S>, role: Role) -> Self {
        self.add(path, method_router, Some(role))
    }

    fn add(mut self, path: &str, method_router: MethodRouter<S>, route_role: Option<Role>) -> Self {
        let method_router = match RoleRequirement::resolve(route_role, self.group) {
            Some(requirement) => guard(method_router, requirement),
            None => method_router,
        };
        self.router = self.router.route(path, method_router);
        self
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}

impl<S> Default for RoleGuard<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
