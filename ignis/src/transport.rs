//! The [`Transport`] trait.
use std::future::Future;

use crate::{
    Connection, Result,
    protocol::{RequestBuilder, Response},
};

/// Something that can carry one request at a time.
///
/// Cursors and queries are generic over this trait, so they run over a
/// [`Connection`], a mutable reference to one, or a pooled connection.
pub trait Transport: Send {
    /// Allocate the next correlation id.
    fn next_correlation_id(&mut self) -> i64;

    /// Send request and receive its response.
    fn send_and_receive(
        &mut self,
        request: RequestBuilder,
    ) -> impl Future<Output = Result<Response>> + Send;

    /// Queue a server side resource to be closed before the next request.
    ///
    /// Called from [`Drop`], thus must not block.
    fn defer_close(&mut self, resource_id: i64);

    /// Close a server side resource now.
    fn close_resource(&mut self, resource_id: i64) -> impl Future<Output = Result<()>> + Send;

    /// Default number of rows per cursor page.
    fn page_size(&self) -> i32;

    /// Start a request with a fresh correlation id.
    fn begin_request(&mut self, op: i16) -> RequestBuilder {
        RequestBuilder::new(op, self.next_correlation_id())
    }
}

impl Transport for Connection {
    fn next_correlation_id(&mut self) -> i64 {
        Connection::next_correlation_id(self)
    }

    fn send_and_receive(
        &mut self,
        request: RequestBuilder,
    ) -> impl Future<Output = Result<Response>> + Send {
        Connection::send_and_receive(self, request)
    }

    fn defer_close(&mut self, resource_id: i64) {
        Connection::defer_close(self, resource_id);
    }

    fn close_resource(&mut self, resource_id: i64) -> impl Future<Output = Result<()>> + Send {
        Connection::close_resource(self, resource_id)
    }

    fn page_size(&self) -> i32 {
        self.config().page_size
    }
}

impl<T> Transport for &mut T
where
    T: Transport,
{
    fn next_correlation_id(&mut self) -> i64 {
        T::next_correlation_id(self)
    }

    fn send_and_receive(
        &mut self,
        request: RequestBuilder,
    ) -> impl Future<Output = Result<Response>> + Send {
        T::send_and_receive(self, request)
    }

    fn defer_close(&mut self, resource_id: i64) {
        T::defer_close(self, resource_id);
    }

    fn close_resource(&mut self, resource_id: i64) -> impl Future<Output = Result<()>> + Send {
        T::close_resource(self, resource_id)
    }

    fn page_size(&self) -> i32 {
        T::page_size(self)
    }
}
