use async_trait::async_trait;
use core_logic::{
    AmountGenerator, ConfigError, DispatchError, DispatchOptions, Dispatcher, EndpointPool,
    NetworkError, ReportSink, RotationPolicy, RpcEndpoint, Signer, SignerSet, TransferClient,
    TransferOutcome, TransferRequest,
};
use ethers::types::{Address, TxHash, U256};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const KEYS: [&str; 3] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

const RECIPIENT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

#[derive(Debug, Clone)]
struct Submission {
    endpoint: String,
    signer: Address,
    amount: U256,
}

/// In-memory client. Submission attempts are numbered from zero in call order.
#[derive(Default)]
struct ScriptedClient {
    rejected: HashSet<usize>,
    dropped: HashSet<usize>,
    stalled: HashSet<usize>,
    unreachable: HashSet<String>,
    submissions: Mutex<Vec<Submission>>,
}

impl ScriptedClient {
    fn rejecting(attempts: &[usize]) -> Self {
        Self {
            rejected: attempts.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferClient for ScriptedClient {
    async fn chain_id(&self, _endpoint: &RpcEndpoint) -> Result<u64, NetworkError> {
        Ok(30732)
    }

    async fn submit(
        &self,
        endpoint: &RpcEndpoint,
        signer: &Signer,
        request: &TransferRequest,
    ) -> Result<TxHash, DispatchError> {
        let attempt = {
            let mut submissions = self.submissions.lock().unwrap();
            submissions.push(Submission {
                endpoint: endpoint.url.clone(),
                signer: signer.address(),
                amount: request.amount,
            });
            submissions.len() - 1
        };

        if self.unreachable.contains(&endpoint.url) {
            return Err(DispatchError::Connectivity {
                endpoint: endpoint.url.clone(),
                reason: "connection refused".to_string(),
            });
        }
        if self.rejected.contains(&attempt) {
            return Err(DispatchError::Submission {
                reason: "insufficient funds for gas * price + value".to_string(),
            });
        }

        Ok(TxHash::from_low_u64_be(attempt as u64 + 1))
    }

    async fn await_confirmation(
        &self,
        _endpoint: &RpcEndpoint,
        tx_hash: TxHash,
    ) -> Result<u64, DispatchError> {
        let attempt = (tx_hash.to_low_u64_be() - 1) as usize;

        if self.stalled.contains(&attempt) {
            std::future::pending::<()>().await;
        }
        if self.dropped.contains(&attempt) {
            return Err(DispatchError::Dropped {
                tx_hash: format!("{:?}", tx_hash),
            });
        }

        Ok(100 + attempt as u64)
    }
}

#[derive(Default)]
struct RecordingSink {
    seen: Vec<(usize, usize, bool)>,
}

impl ReportSink for RecordingSink {
    fn record(&mut self, index: usize, total: usize, outcome: &TransferOutcome) {
        self.seen.push((index, total, outcome.is_confirmed()));
    }
}

/// Cancels the batch once `after` outcomes have been recorded.
struct CancellingSink {
    token: CancellationToken,
    after: usize,
    count: usize,
}

impl ReportSink for CancellingSink {
    fn record(&mut self, _index: usize, _total: usize, _outcome: &TransferOutcome) {
        self.count += 1;
        if self.count == self.after {
            self.token.cancel();
        }
    }
}

fn signers(count: usize) -> SignerSet {
    SignerSet::from_private_keys(&KEYS[..count]).unwrap()
}

fn pool(urls: &[&str]) -> EndpointPool {
    let urls: Vec<String> = urls.iter().map(|u| u.to_string()).collect();
    EndpointPool::new(&urls, Duration::from_millis(50)).unwrap()
}

fn recipient() -> Address {
    RECIPIENT.parse().unwrap()
}

fn milli(value: u64) -> U256 {
    U256::from(value) * U256::exp10(15)
}

#[tokio::test]
async fn test_all_confirmed_round_robin_signers() {
    let signers = signers(2);
    let expected: Vec<Address> = [0, 1, 0].iter().map(|&i| signers.addresses()[i]).collect();

    let dispatcher = Dispatcher::new(
        ScriptedClient::default(),
        signers,
        AmountGenerator::fixed(0.001).unwrap(),
        recipient(),
    );
    let mut pool = pool(&["http://127.0.0.1:8545"]);
    let mut outcomes: Vec<TransferOutcome> = Vec::new();

    let report = dispatcher
        .run(&mut pool, 3, &mut outcomes, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(TransferOutcome::is_confirmed));
    assert_eq!(
        outcomes.iter().map(TransferOutcome::signer).collect::<Vec<_>>(),
        expected
    );
    assert!(outcomes.iter().all(|o| o.amount() == milli(1)));

    let blocks: Vec<u64> = outcomes
        .iter()
        .map(|o| match o {
            TransferOutcome::Confirmed { block_number, .. } => *block_number,
            TransferOutcome::Failed { .. } => 0,
        })
        .collect();
    assert_eq!(blocks, vec![100, 101, 102]);

    assert_eq!(report.outcomes, outcomes);
    assert_eq!(report.summary.confirmed, 3);
    assert_eq!(report.summary.failed, 0);
    assert_eq!(report.summary.confirmed_amount, "0.003");
}

#[tokio::test]
async fn test_rejected_submission_is_recorded_and_batch_continues() {
    let dispatcher = Dispatcher::new(
        ScriptedClient::rejecting(&[1]),
        signers(2),
        AmountGenerator::fixed(0.001).unwrap(),
        recipient(),
    );
    let mut pool = pool(&["http://127.0.0.1:8545"]);
    let mut outcomes: Vec<TransferOutcome> = Vec::new();

    dispatcher
        .run(&mut pool, 2, &mut outcomes, &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcomes[0].is_confirmed());
    match &outcomes[1] {
        TransferOutcome::Failed { error, amount, .. } => {
            assert!(error.is_submission_stage());
            assert_eq!(*amount, milli(1));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(outcomes[1]
        .reason()
        .unwrap()
        .contains("insufficient funds"));
}

#[tokio::test]
async fn test_failure_does_not_abort_following_transfers() {
    let dispatcher = Dispatcher::new(
        ScriptedClient::rejecting(&[1]),
        signers(2),
        AmountGenerator::fixed(0.001).unwrap(),
        recipient(),
    );
    let mut pool = pool(&["http://127.0.0.1:8545"]);
    let mut sink = RecordingSink::default();

    let report = dispatcher
        .run(&mut pool, 3, &mut sink, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(dispatcher.client().submissions().len(), 3);
    assert_eq!(sink.seen, vec![(0, 3, true), (1, 3, false), (2, 3, true)]);
    assert_eq!(report.summary.confirmed, 2);
    assert_eq!(report.summary.failed, 1);
}

#[tokio::test]
async fn test_random_amounts_stay_in_range() {
    let dispatcher = Dispatcher::new(
        ScriptedClient::default(),
        signers(3),
        AmountGenerator::random(0.001, 0.003).unwrap(),
        recipient(),
    );
    let mut pool = pool(&["http://127.0.0.1:8545"]);
    let mut outcomes: Vec<TransferOutcome> = Vec::new();

    dispatcher
        .run(&mut pool, 100, &mut outcomes, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 100);
    for outcome in outcomes.iter().filter(|o| o.is_confirmed()) {
        assert!(outcome.amount() >= milli(1));
        assert!(outcome.amount() < milli(3));
    }
}

#[tokio::test]
async fn test_zero_count_is_rejected_before_submission() {
    let dispatcher = Dispatcher::new(
        ScriptedClient::default(),
        signers(1),
        AmountGenerator::fixed(0.001).unwrap(),
        recipient(),
    );
    let mut pool = pool(&["http://127.0.0.1:8545"]);
    let mut outcomes: Vec<TransferOutcome> = Vec::new();

    let err = dispatcher
        .run(&mut pool, 0, &mut outcomes, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    assert!(dispatcher.client().submissions().is_empty());
}

#[tokio::test]
async fn test_dropped_transaction_fails_that_index_only() {
    let client = ScriptedClient {
        dropped: [0].into_iter().collect(),
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(
        client,
        signers(1),
        AmountGenerator::fixed(0.001).unwrap(),
        recipient(),
    );
    let mut pool = pool(&["http://127.0.0.1:8545"]);
    let mut outcomes: Vec<TransferOutcome> = Vec::new();

    dispatcher
        .run(&mut pool, 2, &mut outcomes, &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(
        &outcomes[0],
        TransferOutcome::Failed {
            error: DispatchError::Dropped { .. },
            ..
        }
    ));
    assert!(outcomes[1].is_confirmed());
}

#[tokio::test]
async fn test_confirmation_timeout_fails_the_index() {
    let client = ScriptedClient {
        stalled: [0].into_iter().collect(),
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(
        client,
        signers(1),
        AmountGenerator::fixed(0.001).unwrap(),
        recipient(),
    )
    .with_options(DispatchOptions {
        confirmation_timeout: Some(Duration::from_millis(50)),
        rotation: RotationPolicy::Never,
    });
    let mut pool = pool(&["http://127.0.0.1:8545"]);
    let mut outcomes: Vec<TransferOutcome> = Vec::new();

    dispatcher
        .run(&mut pool, 2, &mut outcomes, &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(
        &outcomes[0],
        TransferOutcome::Failed {
            error: DispatchError::Timeout { .. },
            ..
        }
    ));
    assert!(outcomes[1].is_confirmed());
}

#[tokio::test]
async fn test_no_rotation_by_default() {
    let client = ScriptedClient {
        unreachable: ["http://127.0.0.1:8545".to_string()].into_iter().collect(),
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(
        client,
        signers(1),
        AmountGenerator::fixed(0.001).unwrap(),
        recipient(),
    );
    let mut pool = pool(&["http://127.0.0.1:8545", "http://127.0.0.1:8546"]);
    let mut outcomes: Vec<TransferOutcome> = Vec::new();

    dispatcher
        .run(&mut pool, 3, &mut outcomes, &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcomes.iter().all(|o| !o.is_confirmed()));
    assert!(dispatcher
        .client()
        .submissions()
        .iter()
        .all(|s| s.endpoint == "http://127.0.0.1:8545"));
    assert_eq!(pool.current_index(), 0);
    assert_eq!(pool.health_status()[0].failure_count, 3);
}

#[tokio::test]
async fn test_rotation_moves_next_index_without_retrying() {
    let client = ScriptedClient {
        unreachable: ["http://127.0.0.1:8545".to_string()].into_iter().collect(),
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(
        client,
        signers(1),
        AmountGenerator::fixed(0.001).unwrap(),
        recipient(),
    )
    .with_options(DispatchOptions {
        confirmation_timeout: None,
        rotation: RotationPolicy::OnConnectivityFailure,
    });
    let mut pool = pool(&["http://127.0.0.1:8545", "http://127.0.0.1:8546"]);
    let mut outcomes: Vec<TransferOutcome> = Vec::new();

    dispatcher
        .run(&mut pool, 3, &mut outcomes, &CancellationToken::new())
        .await
        .unwrap();

    let endpoints: Vec<String> = dispatcher
        .client()
        .submissions()
        .into_iter()
        .map(|s| s.endpoint)
        .collect();
    assert_eq!(
        endpoints,
        vec![
            "http://127.0.0.1:8545",
            "http://127.0.0.1:8546",
            "http://127.0.0.1:8546"
        ]
    );
    assert!(!outcomes[0].is_confirmed());
    assert!(outcomes[1].is_confirmed());
    assert!(outcomes[2].is_confirmed());
}

#[tokio::test]
async fn test_cancellation_is_checked_between_transfers() {
    let dispatcher = Dispatcher::new(
        ScriptedClient::default(),
        signers(2),
        AmountGenerator::fixed(0.001).unwrap(),
        recipient(),
    );
    let mut pool = pool(&["http://127.0.0.1:8545"]);
    let token = CancellationToken::new();
    let mut sink = CancellingSink {
        token: token.clone(),
        after: 2,
        count: 0,
    };

    let report = dispatcher.run(&mut pool, 5, &mut sink, &token).await.unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(dispatcher.client().submissions().len(), 2);
    assert_eq!(report.summary.skipped, 3);
}

#[tokio::test]
async fn test_submitted_amounts_match_outcomes() {
    let dispatcher = Dispatcher::new(
        ScriptedClient::rejecting(&[0]),
        signers(2),
        AmountGenerator::random(0.001, 0.002).unwrap(),
        recipient(),
    );
    let mut pool = pool(&["http://127.0.0.1:8545"]);
    let mut outcomes: Vec<TransferOutcome> = Vec::new();

    dispatcher
        .run(&mut pool, 4, &mut outcomes, &CancellationToken::new())
        .await
        .unwrap();

    let submissions = dispatcher.client().submissions();
    for (submission, outcome) in submissions.iter().zip(&outcomes) {
        assert_eq!(submission.amount, outcome.amount());
        assert_eq!(submission.signer, outcome.signer());
    }
}
