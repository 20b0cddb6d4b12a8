//! One verb over several requests at once.

use futures::future::join_all;
use serde_json::{Map, Value};

use crate::error::ApplicationResult;
use crate::request::Request;

/// Requests executed together.
#[derive(Debug)]
pub struct Batch<'a> {
    requests: Vec<&'a mut Request>,
}

impl<'a> Batch<'a> {
    /// Groups `requests`.
    #[must_use]
    pub const fn new(requests: Vec<&'a mut Request>) -> Self {
        Self { requests }
    }

    /// Runs `get` on every request concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error in request order; every request still runs.
    pub async fn get(&mut self) -> ApplicationResult<&mut Self> {
        let results = join_all(self.requests.iter_mut().map(|request| async move {
            request.get().await.map(|_| ())
        }))
        .await;
        results.into_iter().collect::<ApplicationResult<()>>()?;
        Ok(self)
    }

    /// Runs `post` with `data` on every request concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error in request order; every request still runs.
    pub async fn post(&mut self, data: &Map<String, Value>) -> ApplicationResult<&mut Self> {
        let results = join_all(self.requests.iter_mut().map(|request| async move {
            request.post(data.clone()).await.map(|_| ())
        }))
        .await;
        results.into_iter().collect::<ApplicationResult<()>>()?;
        Ok(self)
    }

    /// Runs `put` with `data` on every request concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error in request order; every request still runs.
    pub async fn put(&mut self, data: &Map<String, Value>) -> ApplicationResult<&mut Self> {
        let results = join_all(self.requests.iter_mut().map(|request| async move {
            request.put(data.clone()).await.map(|_| ())
        }))
        .await;
        results.into_iter().collect::<ApplicationResult<()>>()?;
        Ok(self)
    }

    /// Runs `delete` on every request concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error in request order; every request still runs.
    pub async fn delete(&mut self) -> ApplicationResult<&mut Self> {
        let results = join_all(self.requests.iter_mut().map(|request| async move {
            request.delete().await.map(|_| ())
        }))
        .await;
        results.into_iter().collect::<ApplicationResult<()>>()?;
        Ok(self)
    }

    /// Returns whether no request failed.
    #[must_use]
    pub fn successful(&self) -> bool {
        self.failed_requests().is_empty()
    }

    /// Requests whose response did not fail.
    #[must_use]
    pub fn successful_requests(&self) -> Vec<&Request> {
        self.requests
            .iter()
            .filter(|request| request.response().is_some_and(|response| !response.is_failed()))
            .map(|request| &**request)
            .collect()
    }

    /// Requests whose response failed.
    #[must_use]
    pub fn failed_requests(&self) -> Vec<&Request> {
        self.requests
            .iter()
            .filter(|request| request.response().is_some_and(|response| response.is_failed()))
            .map(|request| &**request)
            .collect()
    }
}
