use core_logic::{ConfigError, EndpointPool, SignerSet};
use std::time::Duration;

const KEYS: [&str; 3] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

fn pool(count: usize) -> EndpointPool {
    let urls: Vec<String> = (0..count)
        .map(|i| format!("http://127.0.0.1:{}", 8545 + i))
        .collect();
    EndpointPool::new(&urls, Duration::from_millis(100)).unwrap()
}

#[test]
fn test_rotation_cycles_back_to_start() {
    for size in 1..=4 {
        let mut pool = pool(size);
        let start = pool.current().url.clone();

        for step in 1..=size {
            pool.rotate();
            assert_eq!(pool.current_index(), step % size);
        }
        assert_eq!(pool.current().url, start);
    }
}

#[test]
fn test_single_endpoint_rotation_is_noop() {
    let mut pool = pool(1);
    let url = pool.current().url.clone();

    assert_eq!(pool.rotate().url, url);
    assert_eq!(pool.current_index(), 0);
}

#[test]
fn test_pool_keeps_configured_order() {
    let pool = pool(3);
    assert_eq!(
        pool.urls(),
        vec![
            "http://127.0.0.1:8545",
            "http://127.0.0.1:8546",
            "http://127.0.0.1:8547"
        ]
    );
    assert!(pool.health_status()[0].current);
}

#[test]
fn test_empty_url_list_rejected() {
    let err = EndpointPool::new(&[], Duration::from_secs(1)).unwrap_err();
    assert_eq!(err, ConfigError::NoEndpoints);
}

#[test]
fn test_signer_for_is_modular() {
    for size in 1..=3 {
        let signers = SignerSet::from_private_keys(&KEYS[..size]).unwrap();
        let addresses = signers.addresses();

        for index in 0..20 {
            assert_eq!(signers.position_for(index), index % size);
            assert_eq!(signers.signer_for(index).address(), addresses[index % size]);
        }
    }
}

#[test]
fn test_empty_signer_set_rejected() {
    let no_keys: [&str; 0] = [];
    let err = SignerSet::from_private_keys(&no_keys).unwrap_err();
    assert!(matches!(
        err,
        core_logic::CoreError::Config(ConfigError::EmptySigners)
    ));
}
