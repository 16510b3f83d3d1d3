#[derive(serde::Serialize, serde::Deserialize)]
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ShardAssignmentsRequest {}
#[derive(serde::Serialize, serde::Deserialize)]
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ShardAssignmentsResponse {
    #[prost(message, repeated, tag = "1")]
    pub assignments: ::prost::alloc::vec::Vec<ShardAssignment>,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ShardAssignment {
    #[prost(uint32, tag = "1")]
    pub shard_id: u32,
    /// Address of the shard leader.
    #[prost(string, tag = "2")]
    pub leader: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub hash_range: ::core::option::Option<HashRange>,
}
/// Both bounds are inclusive.
#[derive(serde::Serialize, serde::Deserialize)]
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct HashRange {
    #[prost(uint32, tag = "1")]
    pub min_inclusive: u32,
    #[prost(uint32, tag = "2")]
    pub max_inclusive: u32,
}
/// BEGIN loglet-codegen
pub type CoordinatorServiceStream<T> = loglet_common::ServiceStream<crate::Result<T>>;
#[cfg_attr(any(test, feature = "testsuite"), mockall::automock)]
#[async_trait::async_trait]
pub trait CoordinatorService: std::fmt::Debug + dyn_clone::DynClone + Send + Sync + 'static {
    async fn shard_assignments(
        &mut self,
        request: ShardAssignmentsRequest,
    ) -> crate::Result<CoordinatorServiceStream<ShardAssignmentsResponse>>;
}
dyn_clone::clone_trait_object!(CoordinatorService);
#[cfg(any(test, feature = "testsuite"))]
impl Clone for MockCoordinatorService {
    fn clone(&self) -> Self {
        MockCoordinatorService::new()
    }
}
#[derive(Debug, Clone)]
pub struct CoordinatorServiceClient {
    inner: Box<dyn CoordinatorService>,
}
impl CoordinatorServiceClient {
    pub fn new<T>(instance: T) -> Self
    where
        T: CoordinatorService,
    {
        Self { inner: Box::new(instance) }
    }
    pub fn from_channel(channel: tonic::transport::Channel) -> Self {
        CoordinatorServiceClient::new(
            CoordinatorServiceGrpcClientAdapter::new(
                coordinator_service_grpc_client::CoordinatorServiceGrpcClient::new(channel),
            ),
        )
    }
    #[cfg(any(test, feature = "testsuite"))]
    pub fn mock() -> MockCoordinatorService {
        MockCoordinatorService::new()
    }
}
#[async_trait::async_trait]
impl CoordinatorService for CoordinatorServiceClient {
    async fn shard_assignments(
        &mut self,
        request: ShardAssignmentsRequest,
    ) -> crate::Result<CoordinatorServiceStream<ShardAssignmentsResponse>> {
        self.inner.shard_assignments(request).await
    }
}
#[cfg(any(test, feature = "testsuite"))]
pub mod mock {
    use super::*;
    #[derive(Debug, Clone)]
    struct MockCoordinatorServiceWrapper {
        inner: std::sync::Arc<tokio::sync::Mutex<MockCoordinatorService>>,
    }
    #[async_trait::async_trait]
    impl CoordinatorService for MockCoordinatorServiceWrapper {
        async fn shard_assignments(
            &mut self,
            request: ShardAssignmentsRequest,
        ) -> crate::Result<CoordinatorServiceStream<ShardAssignmentsResponse>> {
            self.inner.lock().await.shard_assignments(request).await
        }
    }
    impl From<MockCoordinatorService> for CoordinatorServiceClient {
        fn from(mock: MockCoordinatorService) -> Self {
            let mock_wrapper = MockCoordinatorServiceWrapper {
                inner: std::sync::Arc::new(tokio::sync::Mutex::new(mock)),
            };
            CoordinatorServiceClient::new(mock_wrapper)
        }
    }
}
#[derive(Debug, Clone)]
pub struct CoordinatorServiceGrpcClientAdapter<T> {
    inner: T,
}
impl<T> CoordinatorServiceGrpcClientAdapter<T> {
    pub fn new(instance: T) -> Self {
        Self { inner: instance }
    }
}
#[async_trait::async_trait]
impl CoordinatorService
for CoordinatorServiceGrpcClientAdapter<
    coordinator_service_grpc_client::CoordinatorServiceGrpcClient<tonic::transport::Channel>,
> {
    async fn shard_assignments(
        &mut self,
        request: ShardAssignmentsRequest,
    ) -> crate::Result<CoordinatorServiceStream<ShardAssignmentsResponse>> {
        self.inner
            .shard_assignments(request)
            .await
            .map(|response| CoordinatorServiceStream::from_streaming(response.into_inner()))
            .map_err(|status| status.into())
    }
}
/// Generated client implementations.
pub mod coordinator_service_grpc_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;
    #[derive(Debug, Clone)]
    pub struct CoordinatorServiceGrpcClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl CoordinatorServiceGrpcClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> CoordinatorServiceGrpcClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> CoordinatorServiceGrpcClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
            >>::Error: Into<StdError> + Send + Sync,
        {
            CoordinatorServiceGrpcClient::new(InterceptedService::new(inner, interceptor))
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        pub async fn shard_assignments(
            &mut self,
            request: impl tonic::IntoRequest<super::ShardAssignmentsRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::ShardAssignmentsResponse>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/loglet.coordinator.CoordinatorService/ShardAssignments",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(
                    GrpcMethod::new(
                        "loglet.coordinator.CoordinatorService",
                        "ShardAssignments",
                    ),
                );
            self.inner.server_streaming(req, path, codec).await
        }
    }
}
