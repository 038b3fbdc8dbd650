//! Access control middleware for the ShopLocal server.
//!
//! Wrap any route or service with [`AclMiddlewareFactory`] to require a valid access token and one of a set of
//! roles. Admin is a universal override: an admin token passes every role check. An empty role list means "any
//! authenticated actor".
//!
//! On success the validated [`JwtClaims`] are stored in the request extensions, where the claims extractor picks
//! them up without re-validating the token.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use shop_local_engine::db_types::Role;

use crate::{
    auth::{bearer_token, TokenIssuer},
    errors::{AuthError, ServerError},
};

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let issuer = req
                .app_data::<web::Data<TokenIssuer>>()
                .ok_or_else(|| {
                    log::error!("No token issuer found in app data");
                    ServerError::InitializeError("No token issuer registered".to_string())
                })?
                .clone();
            let token = bearer_token(req.request()).ok_or(ServerError::AuthenticationError(AuthError::MissingToken))?;
            let claims = issuer.verify_token(token).map_err(|e| {
                log::debug!("💻️ Rejecting request with invalid token. {e}");
                ServerError::AuthenticationError(e)
            })?;
            let role_ok =
                required_roles.is_empty() || claims.role == Role::Admin || required_roles.contains(&claims.role);
            if !role_ok {
                log::debug!("💻️ {} #{} may not access this route", claims.role, claims.sub);
                return Err(ServerError::InsufficientPermissions("Access denied".to_string()).into());
            }
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
