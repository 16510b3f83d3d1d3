// Copyright (C) 2023 Loglet, Inc.
//
// Loglet is offered under the AGPL v3.0 and as commercial software.
// For commercial licensing, contact us at hello@loglet.io.
//
// AGPL:
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::{ReceiverStream, UnboundedReceiverStream};

/// A stream of service messages, erasing the producer.
///
/// Service seams hand these out so consumers do not depend on whether the
/// messages come from a local channel or a remote gRPC stream.
pub struct ServiceStream<T> {
    inner: BoxStream<'static, T>,
}

impl<T> fmt::Debug for ServiceStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceStream").finish()
    }
}

impl<T> ServiceStream<T>
where T: Send + 'static
{
    pub fn new_bounded(capacity: usize) -> (mpsc::Sender<T>, Self) {
        let (sender, receiver) = mpsc::channel(capacity);
        (sender, receiver.into())
    }

    pub fn new_unbounded() -> (mpsc::UnboundedSender<T>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, receiver.into())
    }

    pub fn empty() -> Self {
        Self {
            inner: futures::stream::empty().boxed(),
        }
    }
}

impl<T, E> ServiceStream<Result<T, E>>
where
    T: Send + 'static,
    E: From<tonic::Status> + Send + 'static,
{
    /// Wraps a tonic server-streaming response, converting transport errors
    /// into the service error type.
    pub fn from_streaming(streaming: tonic::Streaming<T>) -> Self {
        Self {
            inner: streaming.map(|message| message.map_err(E::from)).boxed(),
        }
    }
}

impl<T> From<mpsc::Receiver<T>> for ServiceStream<T>
where T: Send + 'static
{
    fn from(receiver: mpsc::Receiver<T>) -> Self {
        Self {
            inner: ReceiverStream::new(receiver).boxed(),
        }
    }
}

impl<T> From<mpsc::UnboundedReceiver<T>> for ServiceStream<T>
where T: Send + 'static
{
    fn from(receiver: mpsc::UnboundedReceiver<T>) -> Self {
        Self {
            inner: UnboundedReceiverStream::new(receiver).boxed(),
        }
    }
}

impl<T> Stream for ServiceStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}
