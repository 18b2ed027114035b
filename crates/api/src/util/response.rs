use crate::error::{Error, Result};
use http_body_util::Full;
use hyper::{
    body::Bytes,
    header::{HeaderValue, CONTENT_TYPE},
    Response, StatusCode,
};
use serde::Serialize;

pub type Reply = Response<Full<Bytes>>;

#[derive(Serialize)]
struct Message<'a> {
    message: &'a str,
}

pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Reply> {
    let bytes = serde_json::to_vec(value).map_err(|err| {
        log::error!("cannot serialize response body: {err}");
        Error::Persistence("Something went wrong")
    })?;
    let mut res = Response::new(Full::new(Bytes::from(bytes)));
    *res.status_mut() = status;
    assert!(res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json")).is_none());
    Ok(res)
}

pub fn message(status: StatusCode, message: &str) -> Reply {
    let bytes = serde_json::to_vec(&Message { message }).unwrap_or_default();
    let mut res = Response::new(Full::new(Bytes::from(bytes)));
    *res.status_mut() = status;
    assert!(res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json")).is_none());
    res
}

pub fn empty(status: StatusCode) -> Reply {
    let mut res = Response::new(Full::default());
    *res.status_mut() = status;
    res
}

impl From<Error> for Reply {
    fn from(err: Error) -> Self {
        message(err.status(), err.message())
    }
}
