//! Response pipelines
//!
//! Each operation declares an ordered chain of steps that turn the outcome of its
//! transport call into a typed result or a classified error. A step sees the pending
//! error and the response, then either hands the context to the next step or finishes
//! the call.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, ErrorKind, Result};
use crate::transport::{HttpResponse, TransportError};

/// Header Jenkins uses to carry a diagnostic message
pub const ERROR_HEADER: &str = "x-error";

/// Outcome of a transport call as seen by the pipeline
#[derive(Debug, Default)]
pub struct Context {
    pub err: Option<ClientError>,
    pub res: Option<HttpResponse>,
}

impl Context {
    /// Builds the context for a completed transport call
    ///
    /// A non-2xx response becomes a pending protocol error named after the status.
    /// When the server supplied an `x-error` header, its text replaces that message.
    pub fn from_outcome(outcome: std::result::Result<HttpResponse, TransportError>) -> Self {
        match outcome {
            Ok(res) => {
                let err = (!res.is_success()).then(|| {
                    let reason = StatusCode::from_u16(res.status)
                        .ok()
                        .and_then(|status| status.canonical_reason())
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("status {}", res.status));
                    ClientError::protocol(reason).with_status(res.status)
                });
                let mut ctx = Self { err, res: Some(res) };
                ctx.apply_error_header();
                ctx
            }
            Err(e) => Self {
                err: Some(ClientError::transport(e)),
                res: None,
            },
        }
    }

    fn apply_error_header(&mut self) {
        if self.err.is_none() {
            return;
        }
        if let Some(message) = self.error_header() {
            self.err = self.err.take().map(|err| err.with_message(message));
        }
    }

    fn error_header(&self) -> Option<String> {
        self.res
            .as_ref()
            .and_then(|res| res.header(ERROR_HEADER))
            .map(|message| message.replace('?', "\""))
    }

    fn status(&self) -> Option<u16> {
        self.res.as_ref().map(|res| res.status)
    }

    fn response(&self) -> Result<&HttpResponse> {
        self.res
            .as_ref()
            .ok_or_else(|| ClientError::data_shape("returned bad data"))
    }
}

/// What a step decided
pub enum Flow<T> {
    /// Hand the (possibly modified) context to the next step
    Next(Context),
    /// Finish the call
    Done(Result<T>),
}

type Step<T> = Box<dyn Fn(Context) -> Flow<T> + Send + Sync>;

/// An ordered chain of response steps
pub struct Pipeline<T> {
    steps: Vec<Step<T>>,
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pipeline<T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn then<F>(mut self, step: F) -> Self
    where
        F: Fn(Context) -> Flow<T> + Send + Sync + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    /// Runs the steps in order until one finishes the call
    pub fn run(&self, mut ctx: Context) -> Result<T> {
        for step in &self.steps {
            match step(ctx) {
                Flow::Next(next) => ctx = next,
                Flow::Done(result) => return result,
            }
        }

        match ctx.err {
            Some(err) => Err(err),
            None => Err(ClientError::protocol("no result")),
        }
    }
}

/// Raises a not-found error `"<label> not found"` on a 404
pub fn not_found<T>(label: &str) -> impl Fn(Context) -> Flow<T> + Send + Sync + use<T> {
    let message = format!("{label} not found");
    move |ctx| match ctx.status() {
        Some(404) => Flow::Done(Err(ClientError::not_found(message.clone()).with_status(404))),
        _ => Flow::Next(ctx),
    }
}

/// Succeeds on exactly 302; any other response raises
///
/// A pending error takes the server-supplied `x-error` message; otherwise `message` is used.
pub fn require_302<T: Default>(
    message: &str,
) -> impl Fn(Context) -> Flow<T> + Send + Sync + use<T> {
    let message = message.to_string();
    move |mut ctx| {
        let Some(status) = ctx.status() else {
            return Flow::Next(ctx);
        };

        if status == 302 {
            return Flow::Done(Ok(T::default()));
        }

        let header = ctx.error_header();
        let err = match (ctx.err.take(), header) {
            (Some(err), Some(header)) => err.with_message(header),
            (Some(err), None) => err.with_message(message.clone()),
            (None, _) => ClientError::protocol(message.clone()).with_status(status),
        };
        Flow::Done(Err(err))
    }
}

/// Clears a pending error when the response status is one of `codes`
pub fn ignore_error_for_status_codes<T>(
    codes: &[u16],
) -> impl Fn(Context) -> Flow<T> + Send + Sync + use<T> {
    let codes = codes.to_vec();
    move |mut ctx| {
        if ctx.err.is_some() && ctx.status().is_some_and(|status| codes.contains(&status)) {
            ctx.err = None;
        }
        Flow::Next(ctx)
    }
}

/// Yields the response body parsed as `T`
pub fn body<T: DeserializeOwned>() -> impl Fn(Context) -> Flow<T> + Send + Sync {
    |ctx| Flow::Done(parse_body::<T>(ctx))
}

/// Yields `body[key]` parsed as `T`
pub fn body_item<T: DeserializeOwned>(
    key: &'static str,
) -> impl Fn(Context) -> Flow<T> + Send + Sync {
    move |ctx| {
        let result = parse_body::<Value>(ctx).and_then(|mut value| {
            let item = value.get_mut(key).map(Value::take).unwrap_or(Value::Null);
            serde_json::from_value(item).map_err(|_| ClientError::data_shape("returned bad data"))
        });
        Flow::Done(result)
    }
}

/// Raises "returned bad data" unless `body[key]` is an array
///
/// Only list operations carry this invariant; it must precede [`body_item`].
pub fn require_array<T>(key: &'static str) -> impl Fn(Context) -> Flow<T> + Send + Sync {
    move |mut ctx| {
        if let Some(err) = ctx.err.take() {
            return Flow::Done(Err(err));
        }

        let is_array = ctx
            .response()
            .ok()
            .and_then(|res| res.json::<Value>().ok())
            .is_some_and(|value| value.get(key).is_some_and(Value::is_array));

        if is_array {
            Flow::Next(ctx)
        } else {
            Flow::Done(Err(ClientError::data_shape("returned bad data")))
        }
    }
}

/// Yields no value
pub fn empty<T: Default>() -> impl Fn(Context) -> Flow<T> + Send + Sync {
    |ctx| match ctx.err {
        Some(err) => Flow::Done(Err(err)),
        None => Flow::Done(Ok(T::default())),
    }
}

/// 404 yields `false`, any other response `true`; only transport failures raise
pub fn exists() -> impl Fn(Context) -> Flow<bool> + Send + Sync {
    |ctx| {
        if ctx.status() == Some(404) {
            return Flow::Done(Ok(false));
        }
        match ctx.err {
            Some(err) if err.kind() == ErrorKind::Transport => Flow::Done(Err(err)),
            _ => Flow::Done(Ok(true)),
        }
    }
}

/// Parses the queue item number from the `location` header
///
/// `http://host/queue/item/42/` yields `42`. A missing or malformed header yields no
/// number rather than an error.
pub fn queue_location() -> impl Fn(Context) -> Flow<Option<u64>> + Send + Sync {
    |ctx| {
        if let Some(err) = ctx.err {
            return Flow::Done(Err(err));
        }

        let number = ctx
            .res
            .as_ref()
            .and_then(|res| res.header("location"))
            .and_then(parse_queue_location);

        Flow::Done(Ok(number))
    }
}

/// Yields the response body as text
pub fn text() -> impl Fn(Context) -> Flow<String> + Send + Sync {
    |ctx| match ctx.err {
        Some(err) => Flow::Done(Err(err)),
        None => Flow::Done(ctx.response().map(HttpResponse::text)),
    }
}

fn parse_body<T: DeserializeOwned>(ctx: Context) -> Result<T> {
    if let Some(err) = ctx.err {
        return Err(err);
    }
    ctx.response()?
        .json::<T>()
        .map_err(|_| ClientError::data_shape("returned bad data"))
}

fn parse_queue_location(location: &str) -> Option<u64> {
    let parts: Vec<&str> = location.split('/').collect();
    let index = parts.len().checked_sub(2)?;
    parts[index].parse().ok()
}
