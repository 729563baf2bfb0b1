use async_trait::async_trait;
use bytes::Bytes;
use dapr::actors::{self, call_context, REENTRANCY_HEADER};
use dapr::proto::{
    BulkPublishRequest, BulkPublishResponse, InvokeActorRequest, InvokeActorResponse,
};
use dapr::transport::{CallMetadata, Code, SidecarService, Status};
use dapr::{ClientOptions, DaprClient, DaprError};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, OnceLock};
use tokio_util::sync::CancellationToken;

// =============================================================================
// IN-PROCESS ACTOR HOST
// =============================================================================

/// Response declared as a base type; the derived variant carries extra fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
enum Shape {
    Base { name: String },
    Derived { name: String, sides: u32 },
}

/// A sidecar that hosts its actors in-process. Every invocation is dispatched
/// with the reentrancy header it arrived with, and actors call each other
/// through a client connected back to the same server.
#[derive(Default)]
struct ActorHost {
    client: OnceLock<DaprClient>,
    seen: Mutex<Vec<(String, Option<String>)>>,
}

impl ActorHost {
    fn client(&self) -> Result<&DaprClient, Status> {
        self.client
            .get()
            .ok_or_else(|| Status::unavailable("actor host not wired"))
    }

    async fn run_method(&self, request: InvokeActorRequest) -> Result<Bytes, Status> {
        self.seen
            .lock()
            .unwrap()
            .push((request.method.clone(), call_context::try_get()));

        let cancel = CancellationToken::new();
        let to_status = |e: DaprError| Status::internal(e.to_string());

        match request.method.as_str() {
            // Returns the token this invocation runs under.
            "WhoAmI" => Ok(json(&call_context::try_get())),
            // Calls another actor, which must observe the same token.
            "Forward" => {
                let proxy = self.client()?.actor_proxy("Echo", "e1").map_err(to_status)?;
                let seen: Option<String> = proxy
                    .invoke_method("WhoAmI", &(), &cancel)
                    .await
                    .map_err(to_status)?;
                Ok(json(&seen))
            }
            // Rewrites the token mid-invocation before calling out.
            "Rewrite" => {
                call_context::set("rewritten").map_err(|e| Status::internal(e.to_string()))?;
                let proxy = self.client()?.actor_proxy("Echo", "e1").map_err(to_status)?;
                let seen: Option<String> = proxy
                    .invoke_method("WhoAmI", &(), &cancel)
                    .await
                    .map_err(to_status)?;
                Ok(json(&seen))
            }
            // Calls back into the actor that invoked it.
            "CallBack" => {
                let proxy = self.client()?.actor_proxy("Caller", "c1").map_err(to_status)?;
                proxy
                    .invoke_method_no_response("Ping", &cancel)
                    .await
                    .map_err(to_status)?;
                Ok(Bytes::new())
            }
            "Ping" => Ok(Bytes::new()),
            "GetNothing" => Ok(Bytes::new()),
            "GetShape" => Ok(json(&Shape::Derived {
                name: "triangle".to_string(),
                sides: 3,
            })),
            other => Err(Status::new(Code::NotFound, format!("no method {other}"))),
        }
    }
}

fn json<T: Serialize>(value: &T) -> Bytes {
    Bytes::from(serde_json::to_vec(value).unwrap())
}

#[async_trait]
impl SidecarService for ActorHost {
    async fn bulk_publish(
        &self,
        _request: BulkPublishRequest,
        _metadata: &CallMetadata,
    ) -> Result<BulkPublishResponse, Status> {
        Ok(BulkPublishResponse::default())
    }

    async fn invoke_actor(
        &self,
        request: InvokeActorRequest,
        _metadata: &CallMetadata,
    ) -> Result<InvokeActorResponse, Status> {
        let headers = request.metadata.clone();
        let data = actors::dispatch(&headers, || self.run_method(request)).await?;
        Ok(InvokeActorResponse { data })
    }
}

fn start_host() -> (DaprClient, Arc<ActorHost>) {
    dapr::logging::setup_tracing();
    let (client, server) = DaprClient::serve(ClientOptions::default(), ActorHost::default());
    let host = server.service();
    host.client.set(client.clone()).unwrap();
    tokio::spawn(server.run());
    (client, host)
}

// =============================================================================
// TESTS
// =============================================================================

#[tokio::test]
async fn test_token_flows_through_an_actor_chain() {
    let (client, host) = start_host();
    let proxy = client.actor_proxy("Forwarder", "f1").unwrap();
    let cancel = CancellationToken::new();

    let seen: Option<String> = call_context::scope(Some("chain-1".to_string()), async {
        proxy.invoke_method("Forward", &(), &cancel).await
    })
    .await
    .unwrap();

    assert_eq!(seen.as_deref(), Some("chain-1"));
    let calls = host.seen.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            ("Forward".to_string(), Some("chain-1".to_string())),
            ("WhoAmI".to_string(), Some("chain-1".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_no_token_outside_of_a_chain() {
    let (client, _host) = start_host();
    let proxy = client.actor_proxy("Forwarder", "f1").unwrap();

    let seen: Option<String> = proxy
        .invoke_method("Forward", &(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(seen, None);
}

#[tokio::test]
async fn test_rewrite_inside_a_method_stays_inside_it() {
    let (client, _host) = start_host();
    let proxy = client.actor_proxy("Forwarder", "f1").unwrap();
    let cancel = CancellationToken::new();

    call_context::scope(Some("outer".to_string()), async {
        let seen: Option<String> = proxy.invoke_method("Rewrite", &(), &cancel).await.unwrap();
        assert_eq!(seen.as_deref(), Some("rewritten"));
        assert_eq!(call_context::try_get().as_deref(), Some("outer"));
    })
    .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_chains_do_not_see_each_other() {
    let (client, _host) = start_host();

    let chains = (0..16).map(|i| {
        let proxy = client.actor_proxy("Forwarder", format!("f{i}")).unwrap();
        let token = format!("chain-{i}");
        tokio::spawn(call_context::scope(Some(token.clone()), async move {
            let seen: Option<String> = proxy
                .invoke_method("Forward", &(), &CancellationToken::new())
                .await
                .unwrap();
            (token, seen)
        }))
    });

    for chain in chains.collect::<Vec<_>>() {
        let (token, seen) = chain.await.unwrap();
        assert_eq!(seen.as_deref(), Some(token.as_str()));
    }
}

#[tokio::test]
async fn test_reentrant_call_back_into_the_caller() {
    let (client, host) = start_host();
    let proxy = client.actor_proxy("Callee", "c2").unwrap();

    call_context::scope(Some("reentrant".to_string()), async {
        proxy
            .invoke_method_no_response("CallBack", &CancellationToken::new())
            .await
            .unwrap();
    })
    .await;

    let calls = host.seen.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    assert!(calls
        .iter()
        .all(|(_, token)| token.as_deref() == Some("reentrant")));
}

#[tokio::test]
async fn test_null_and_polymorphic_responses() {
    let (client, _host) = start_host();
    let proxy = client.actor_proxy("Weak", "w1").unwrap();
    let cancel = CancellationToken::new();

    let nothing: Option<Shape> = proxy.invoke_method("GetNothing", &(), &cancel).await.unwrap();
    assert_eq!(nothing, None);

    let shape: Shape = proxy.invoke_method("GetShape", &(), &cancel).await.unwrap();
    assert_eq!(
        shape,
        Shape::Derived {
            name: "triangle".to_string(),
            sides: 3
        }
    );

    let base: Shape = serde_json::from_str(r#"{"$type":"Base","name":"circle"}"#).unwrap();
    assert_eq!(base, Shape::Base { name: "circle".to_string() });

    proxy.invoke_method_no_response("Ping", &cancel).await.unwrap();
}

#[tokio::test]
async fn test_unknown_method_surfaces_the_status() {
    let (client, _host) = start_host();
    let proxy = client.actor_proxy("Weak", "w1").unwrap();

    let err = proxy
        .invoke_method_no_response("Missing", &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.status().map(Status::code), Some(Code::NotFound));
}

#[tokio::test]
async fn test_header_is_named_as_the_sidecar_expects() {
    assert_eq!(REENTRANCY_HEADER, "Dapr-Reentrancy-Id");
}
