//! Big map lookups against stub accessors

use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tzbind_core::{
    AccessError, Address, AddressKind, BindError, ChainId, Codec, OpCode, Prim, ScriptExprHash,
    TypeDescriptor,
};
use tzbind_rpc::{Bigmap, MemoryAccessor, NetworkAccessor};

/// Answers every request with the same outcome and records what was asked
struct StubAccessor {
    response: Result<Prim, AccessError>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(i64, ScriptExprHash)>>,
}

impl StubAccessor {
    fn answering(response: Result<Prim, AccessError>) -> Arc<Self> {
        Arc::new(Self {
            response,
            delay: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(Prim::int(0)),
            delay: Some(delay),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(i64, ScriptExprHash)> {
        self.calls.lock().unwrap().clone()
    }
}

impl NetworkAccessor for StubAccessor {
    fn fetch(&self, id: i64, digest: &ScriptExprHash) -> BoxFuture<'_, Result<Prim, AccessError>> {
        self.calls.lock().unwrap().push((id, *digest));
        let response = self.response.clone();
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    owner: String,
    count: i64,
    active: bool,
}

tzbind_core::impl_record_codec!(Entry { owner, count, active });

#[tokio::test]
async fn test_absent_key_is_key_not_found() {
    let stub = StubAccessor::answering(Err(AccessError::NotFound));
    let map = Bigmap::<String, i64>::reference(12).with_accessor(stub.clone());

    let err = map.get(&"ghost".to_string()).await.unwrap_err();
    let expected = ScriptExprHash::of_prim(&Prim::string("ghost"));
    assert_eq!(err, BindError::KeyNotFound { digest: expected });
    assert_eq!(stub.calls(), vec![(12, expected)]);
}

#[tokio::test]
async fn test_transport_errors_pass_through() {
    let stub = StubAccessor::answering(Err(AccessError::Cancelled));
    let map = Bigmap::<String, i64>::reference(1).with_accessor(stub);
    assert_eq!(
        map.get(&"k".to_string()).await,
        Err(BindError::Access(AccessError::Cancelled))
    );
}

#[tokio::test]
async fn test_key_type_is_inferred_once() {
    let stub = StubAccessor::answering(Ok(Prim::int(5)));
    let map = Bigmap::<i64, i64>::reference(3).with_accessor(stub.clone());
    assert!(map.key_type().is_none());

    assert_eq!(map.get(&1).await, Ok(5));
    assert_eq!(map.key_type(), Some(&TypeDescriptor::new(OpCode::TInt)));
    assert_eq!(map.get(&2).await, Ok(5));
    assert_eq!(map.key_type(), Some(&TypeDescriptor::new(OpCode::TInt)));

    let calls = stub.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, ScriptExprHash::of_prim(&Prim::int(1)));
    assert_eq!(calls[1].1, ScriptExprHash::of_prim(&Prim::int(2)));
}

#[tokio::test]
async fn test_explicit_key_type_hashes_binary_address() {
    let owner = Address::new(AddressKind::Secp256k1, [9u8; 20]);
    let stub = StubAccessor::answering(Ok(Prim::int(100)));
    let map = Bigmap::<Address, u64>::reference(8)
        .with_key_type(TypeDescriptor::new(OpCode::TAddress))
        .with_accessor(stub.clone());

    assert_eq!(map.get(&owner).await, Ok(100));
    let expected = ScriptExprHash::of_prim(&Prim::bytes(owner.to_bytes().to_vec()));
    assert_eq!(stub.calls(), vec![(8, expected)]);
    assert_eq!(map.key_type(), Some(&TypeDescriptor::new(OpCode::TAddress)));
}

#[tokio::test]
async fn test_key_hash_keys_use_short_form() {
    let owner = Address::new(AddressKind::Ed25519, [3u8; 20]);
    let stub = StubAccessor::answering(Ok(Prim::int(1)));
    let map = Bigmap::<Address, u64>::reference(9)
        .with_key_type(TypeDescriptor::new(OpCode::TKeyHash))
        .with_accessor(stub.clone());

    assert_eq!(map.get(&owner).await, Ok(1));
    let short = owner.to_key_hash_bytes().unwrap().to_vec();
    assert_eq!(short.len(), 21);
    let expected = ScriptExprHash::of_prim(&Prim::bytes(short));
    assert_eq!(stub.calls(), vec![(9, expected)]);
}

#[tokio::test]
async fn test_chain_id_keys_hash_raw_bytes() {
    let chain = ChainId::from_raw([0x7a, 0x06, 0xa7, 0x70]);
    let stub = StubAccessor::answering(Ok(Prim::string("main")));
    let map = Bigmap::<ChainId, String>::reference(4).with_accessor(stub.clone());

    assert_eq!(map.get(&chain).await, Ok("main".to_string()));
    assert_eq!(map.key_type(), Some(&TypeDescriptor::new(OpCode::TChainId)));
    let expected = ScriptExprHash::of_prim(&Prim::bytes(chain.as_bytes().to_vec()));
    assert_eq!(stub.calls(), vec![(4, expected)]);
}

#[tokio::test]
async fn test_wide_value_is_refolded() {
    let wide = Prim::app(
        OpCode::Pair,
        vec![Prim::string("alice"), Prim::int(4), Prim::bool(true)],
    );
    let stub = StubAccessor::answering(Ok(wide));
    let map = Bigmap::<String, Entry>::reference(2).with_accessor(stub);

    let entry = map.get(&"alice".to_string()).await.unwrap();
    assert_eq!(
        entry,
        Entry {
            owner: "alice".to_string(),
            count: 4,
            active: true,
        }
    );
}

#[tokio::test]
async fn test_staged_handle_is_not_queried() {
    let stub = StubAccessor::answering(Ok(Prim::int(1)));
    let mut map = Bigmap::<String, i64>::staged().with_accessor(stub.clone());
    map.stage("a".to_string(), 1).unwrap();

    assert_eq!(map.get(&"a".to_string()).await, Err(BindError::NotAllocated));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_lookup_timeout() {
    let stub = StubAccessor::slow(Duration::from_secs(5));
    let map = Bigmap::<i64, i64>::reference(1).with_accessor(stub);
    assert_eq!(
        map.get_within(&1, Duration::from_millis(20)).await,
        Err(BindError::Timeout)
    );
}

#[tokio::test]
async fn test_memory_accessor_round_trip() {
    let key = "token".to_string();
    let digest = TypeDescriptor::new(OpCode::TString)
        .key_hash(&key.encode(true).unwrap())
        .unwrap();
    let mut accessor = MemoryAccessor::new();
    accessor.insert(44, digest, Prim::app(OpCode::Some, vec![Prim::int(7)]));

    let map = Bigmap::<String, Option<i64>>::reference(44).with_accessor(Arc::new(accessor));
    assert_eq!(map.get(&key).await, Ok(Some(7)));
    assert!(matches!(
        map.get(&"other".to_string()).await,
        Err(BindError::KeyNotFound { .. })
    ));
}

#[test]
fn test_decoded_handle_keeps_entries_and_id() {
    let literal = Prim::seq(vec![Prim::elt(Prim::int(1), Prim::string("one"))]);
    let staged = Bigmap::<i64, String>::decode(&literal).unwrap();
    assert_eq!(staged.staged_entries(), &[(1, "one".to_string())]);
    assert_eq!(staged.encode(false).unwrap(), literal);

    let reference = Bigmap::<i64, String>::decode(&Prim::int(77)).unwrap();
    assert_eq!(reference.id(), Some(77));
    assert_eq!(reference.encode(true).unwrap(), Prim::int(77));
}
