use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::address::Address;
use crate::decoder::TokenMethod;
use crate::error::CallError;

/// Observable state of a read-only contract call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CallState {
    /// No call was issued for this key.
    #[default]
    Idle,
    Loading,
    Failed(String),
    /// Raw ABI-encoded return data.
    Done(Vec<u8>),
}

impl CallState {
    pub fn is_loading(&self) -> bool {
        matches!(self, CallState::Loading)
    }

    pub fn result(&self) -> Option<&[u8]> {
        match self {
            CallState::Done(data) => Some(data),
            _ => None,
        }
    }
}

/// When an already-issued call may be issued again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CachePolicy {
    /// Once issued, a key is never fetched again.
    #[default]
    NeverReload,
    /// Failed keys are fetched again on the next call.
    RetryFailed,
}

/// Identity of a call: chain, target contract and calldata (selector and
/// arguments). The same contract address on another chain is another call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallKey {
    pub chain_id: u64,
    pub address: Address,
    pub calldata: Vec<u8>,
}

impl CallKey {
    pub fn new(chain_id: u64, address: Address, calldata: Vec<u8>) -> Self {
        Self {
            chain_id,
            address,
            calldata,
        }
    }

    pub fn method(chain_id: u64, address: Address, method: TokenMethod) -> Self {
        Self::new(chain_id, address, method.calldata())
    }
}

/// The five views the token resolver reads for one address.
///
/// The bytes32 views share the call of their string counterpart; only the
/// decoding of the return data differs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCalls {
    pub name: CallState,
    pub name_bytes32: CallState,
    pub symbol: CallState,
    pub symbol_bytes32: CallState,
    pub decimals: CallState,
}

/// Backend that executes contract reads.
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn call(
        &self,
        chain_id: u64,
        to: &Address,
        calldata: &[u8],
    ) -> Result<Vec<u8>, CallError>;
}

struct Shared {
    states: RwLock<HashMap<CallKey, CallState>>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn set(&self, key: CallKey, state: CallState) {
        self.states
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, state);
    }
}

/// Front of the call cache. Cheap to clone; every clone shares the same state.
///
/// `call` never blocks: a new key is recorded as loading and queued for the
/// [`CallWorker`], which settles it and bumps the gateway revision.
#[derive(Clone)]
pub struct CallGateway {
    shared: Arc<Shared>,
    queue: mpsc::UnboundedSender<CallKey>,
}

/// Executes queued calls against a [`ContractReader`].
pub struct CallWorker {
    shared: Arc<Shared>,
    queue: mpsc::UnboundedReceiver<CallKey>,
}

impl CallGateway {
    pub fn new() -> (Self, CallWorker) {
        let (revision, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            states: RwLock::new(HashMap::new()),
            revision,
        });
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                shared: shared.clone(),
                queue: tx,
            },
            CallWorker { shared, queue: rx },
        )
    }

    /// Issue a call under `policy` and return its current state.
    pub fn call(&self, key: CallKey, policy: CachePolicy) -> CallState {
        {
            let mut states = self
                .shared
                .states
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            match states.get(&key) {
                Some(CallState::Failed(_)) if policy == CachePolicy::RetryFailed => {}
                Some(state) => return state.clone(),
                None => {}
            }
            states.insert(key.clone(), CallState::Loading);
        }

        tracing::trace!(chain_id = key.chain_id, address = %key.address, calldata = %hex::encode(&key.calldata), "issuing call");
        if let Err(mpsc::error::SendError(key)) = self.queue.send(key) {
            tracing::warn!(address = %key.address, "call worker has stopped");
            let state = CallState::Failed("call worker stopped".to_string());
            self.shared.set(key, state.clone());
            return state;
        }
        CallState::Loading
    }

    /// Current state of a key without issuing it.
    pub fn state(&self, key: &CallKey) -> CallState {
        self.shared
            .states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Issue the `name`, `symbol` and `decimals` calls for a token contract.
    pub fn token_calls(&self, chain_id: u64, address: Address, policy: CachePolicy) -> TokenCalls {
        let key = |method| CallKey::method(chain_id, address, method);
        let name = self.call(key(TokenMethod::Name), policy);
        let symbol = self.call(key(TokenMethod::Symbol), policy);
        let decimals = self.call(key(TokenMethod::Decimals), policy);
        TokenCalls {
            name_bytes32: name.clone(),
            name,
            symbol_bytes32: symbol.clone(),
            symbol,
            decimals,
        }
    }

    /// Bumped every time a call settles.
    pub fn revision(&self) -> u64 {
        *self.shared.revision.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }
}

impl CallWorker {
    /// Process calls until every [`CallGateway`] handle is dropped.
    pub async fn run<R: ContractReader + ?Sized>(mut self, reader: &R) {
        while let Some(key) = self.queue.recv().await {
            self.execute(reader, key).await;
        }
        tracing::debug!("call worker finished");
    }

    /// Process the calls queued right now. Returns how many were executed.
    pub async fn run_until_idle<R: ContractReader + ?Sized>(&mut self, reader: &R) -> usize {
        let mut executed = 0;
        while let Ok(key) = self.queue.try_recv() {
            self.execute(reader, key).await;
            executed += 1;
        }
        executed
    }

    async fn execute<R: ContractReader + ?Sized>(&self, reader: &R, key: CallKey) {
        let state = match reader.call(key.chain_id, &key.address, &key.calldata).await {
            Ok(data) => CallState::Done(data),
            Err(e) => {
                tracing::debug!(chain_id = key.chain_id, address = %key.address, error = %e, "call failed");
                CallState::Failed(e.to_string())
            }
        };
        self.shared.set(key, state);
        self.shared.revision.send_modify(|r| *r += 1);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::decoder::tests::{encode_string, encode_uint};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted reader; unknown keys revert.
    #[derive(Default)]
    pub(crate) struct MockReader {
        responses: Mutex<HashMap<CallKey, Result<Vec<u8>, CallError>>>,
        pub(crate) calls: AtomicUsize,
    }

    impl MockReader {
        pub(crate) fn respond(&self, key: CallKey, response: Result<Vec<u8>, CallError>) {
            self.responses.lock().unwrap().insert(key, response);
        }
    }

    #[async_trait]
    impl ContractReader for MockReader {
        async fn call(
            &self,
            chain_id: u64,
            to: &Address,
            calldata: &[u8],
        ) -> Result<Vec<u8>, CallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let key = CallKey::new(chain_id, *to, calldata.to_vec());
            self.responses
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Err(CallError::Reverted("execution reverted".to_string())))
        }
    }

    fn token() -> Address {
        Address::parse("0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2").unwrap()
    }

    #[tokio::test]
    async fn test_call_loads_then_settles() {
        let (gateway, mut worker) = CallGateway::new();
        let reader = MockReader::default();
        let key = CallKey::method(1, token(), TokenMethod::Decimals);
        reader.respond(key.clone(), Ok(encode_uint(18)));

        assert_eq!(gateway.state(&key), CallState::Idle);
        assert_eq!(gateway.call(key.clone(), CachePolicy::NeverReload), CallState::Loading);
        assert_eq!(worker.run_until_idle(&reader).await, 1);
        assert_eq!(gateway.state(&key), CallState::Done(encode_uint(18)));
        assert_eq!(gateway.revision(), 1);
    }

    #[tokio::test]
    async fn test_never_reload_keeps_failure() {
        let (gateway, mut worker) = CallGateway::new();
        let reader = MockReader::default();
        let key = CallKey::method(1, token(), TokenMethod::Name);

        gateway.call(key.clone(), CachePolicy::NeverReload);
        worker.run_until_idle(&reader).await;
        assert!(matches!(gateway.state(&key), CallState::Failed(_)));

        reader.respond(key.clone(), Ok(encode_string("Maker")));
        let state = gateway.call(key.clone(), CachePolicy::NeverReload);
        assert!(matches!(state, CallState::Failed(_)));
        assert_eq!(worker.run_until_idle(&reader).await, 0);
        assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_failed_requeues() {
        let (gateway, mut worker) = CallGateway::new();
        let reader = MockReader::default();
        let key = CallKey::method(1, token(), TokenMethod::Name);

        gateway.call(key.clone(), CachePolicy::RetryFailed);
        worker.run_until_idle(&reader).await;

        reader.respond(key.clone(), Ok(encode_string("Maker")));
        assert_eq!(gateway.call(key.clone(), CachePolicy::RetryFailed), CallState::Loading);
        worker.run_until_idle(&reader).await;
        assert_eq!(gateway.state(&key), CallState::Done(encode_string("Maker")));
    }

    #[tokio::test]
    async fn test_token_calls_share_keys() {
        let (gateway, mut worker) = CallGateway::new();
        let reader = MockReader::default();

        let calls = gateway.token_calls(1, token(), CachePolicy::NeverReload);
        assert!(calls.name.is_loading() && calls.symbol.is_loading() && calls.decimals.is_loading());
        assert!(calls.name_bytes32.is_loading());
        assert_eq!(worker.run_until_idle(&reader).await, 3);
    }

    #[tokio::test]
    async fn test_same_contract_on_another_chain_is_another_call() {
        let (gateway, mut worker) = CallGateway::new();
        let reader = MockReader::default();
        reader.respond(CallKey::method(4, token(), TokenMethod::Symbol), Ok(encode_string("rMKR")));
        reader.respond(CallKey::method(1, token(), TokenMethod::Symbol), Ok(encode_string("MKR")));

        gateway.call(CallKey::method(4, token(), TokenMethod::Symbol), CachePolicy::NeverReload);
        worker.run_until_idle(&reader).await;

        let mainnet = CallKey::method(1, token(), TokenMethod::Symbol);
        assert_eq!(gateway.state(&mainnet), CallState::Idle);
        assert_eq!(gateway.call(mainnet.clone(), CachePolicy::NeverReload), CallState::Loading);
        assert_eq!(worker.run_until_idle(&reader).await, 1);
        assert_eq!(gateway.state(&mainnet), CallState::Done(encode_string("MKR")));
    }

    #[tokio::test]
    async fn test_subscribers_see_settled_calls() {
        let (gateway, worker) = CallGateway::new();
        let reader = MockReader::default();
        let key = CallKey::method(1, token(), TokenMethod::Symbol);
        reader.respond(key.clone(), Ok(encode_string("MKR")));

        let mut revisions = gateway.subscribe();
        let handle = tokio::spawn(async move { worker.run(&reader).await });

        gateway.call(key.clone(), CachePolicy::NeverReload);
        revisions.changed().await.unwrap();
        assert_eq!(gateway.state(&key), CallState::Done(encode_string("MKR")));

        drop(gateway);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_stopped_worker_fails_calls() {
        let (gateway, worker) = CallGateway::new();
        drop(worker);
        let key = CallKey::method(1, token(), TokenMethod::Name);
        assert!(matches!(
            gateway.call(key.clone(), CachePolicy::NeverReload),
            CallState::Failed(_)
        ));
    }
}
