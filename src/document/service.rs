//! Offline request handlers.
//!
//! When the transport is offline, a service answers requests locally. The
//! handler is looked up by the request's [`RequestKind`] in a table that
//! the service fills at construction.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{PolicyError, UnknownRequestKind};
use crate::types::Payload;

/// Kind of a request, parsed from its wire `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Get,
    List,
    LoadByDate,
    Create,
    Update,
    Delete,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Get => "get",
            RequestKind::List => "list",
            RequestKind::LoadByDate => "load-by-date",
            RequestKind::Create => "create",
            RequestKind::Update => "update",
            RequestKind::Delete => "delete",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = UnknownRequestKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(RequestKind::Get),
            "list" => Ok(RequestKind::List),
            "load-by-date" => Ok(RequestKind::LoadByDate),
            "create" => Ok(RequestKind::Create),
            "update" => Ok(RequestKind::Update),
            "delete" => Ok(RequestKind::Delete),
            other => Err(UnknownRequestKind(other.to_string())),
        }
    }
}

/// Locally produced response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub service_name: String,
    pub result_code: String,
    pub result: Payload,
}

pub type RequestHandler = Rc<dyn Fn(&Payload) -> Result<Payload, PolicyError>>;

/// Enum-keyed handler table for one service.
pub struct ServiceHandlers {
    service_name: String,
    handlers: HashMap<RequestKind, RequestHandler>,
}

impl ServiceHandlers {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            handlers: HashMap::new(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Register the handler for `kind`, replacing any previous one.
    pub fn register(
        &mut self,
        kind: RequestKind,
        handler: impl Fn(&Payload) -> Result<Payload, PolicyError> + 'static,
    ) -> &mut Self {
        self.handlers.insert(kind, Rc::new(handler));
        self
    }

    pub fn handles(&self, kind: RequestKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Answer a request locally.
    ///
    /// A missing handler still answers `"200"` with an empty result. A
    /// failing handler answers `"500"`.
    pub fn dispatch(&self, kind: RequestKind, request: &Payload) -> Reply {
        let (result_code, result) = match self.handlers.get(&kind) {
            Some(handler) => match handler(request) {
                Ok(result) => ("200", result),
                Err(err) => {
                    error!(service = %self.service_name, %kind, %err, "offline handler failed");
                    ("500", Payload::new())
                }
            },
            None => {
                info!(service = %self.service_name, %kind, "no offline handler registered");
                ("200", Payload::new())
            }
        };

        Reply {
            service_name: self.service_name.clone(),
            result_code: result_code.to_string(),
            result,
        }
    }

    /// Parse the wire type, then dispatch.
    pub fn dispatch_str(&self, kind: &str, request: &Payload) -> Result<Reply, UnknownRequestKind> {
        Ok(self.dispatch(kind.parse()?, request))
    }
}
