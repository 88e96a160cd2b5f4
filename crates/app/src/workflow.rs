//! Coin-creation workflow.
//!
//! Drives a quiz definition through deployment:
//! validate the form and credentials, resolve a signer, build the deployment
//! request, submit it through the deployment boundary, and classify the
//! outcome. States: `Form -> Creating -> (Success | Form-with-error)`.
//!
//! `Creating` is the mutual-exclusion gate: while a submission is in flight
//! another `submit` call is rejected without side effects. Nothing is retried
//! automatically; a failed attempt requires an explicit new call.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use common::{CreatedQuiz, DeployConfig, Identity, QuizDefinition};
use tracing::{info, warn};

use chains::evm::{
    content_uri, ChainTarget, CoinDeployer, CoinDeployment, DeployCurrency, DeployError,
    DeployErrorKind, DeploymentReceipt, EvmAddress, GasPolicy, PrivateKeySigner,
    TransactionSigner, WalletSession, WalletSigner,
};

/// Workflow state for one submission cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    /// Accepting input; carries the error from the previous attempt, if any.
    Form { error: Option<String> },
    /// A submission is in flight.
    Creating,
    /// The last submission minted a coin. Terminal for that submission.
    Success { record: CreatedQuiz },
}

impl WorkflowState {
    pub fn is_creating(&self) -> bool {
        matches!(self, WorkflowState::Creating)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            WorkflowState::Form { error } => error.as_deref(),
            _ => None,
        }
    }
}

/// Why a `submit` call returned without a coin.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmitError {
    /// A submission is already in flight; the call had no effect.
    #[error("A coin creation is already in progress")]
    InFlight,
    /// Input or configuration rejected before any side effect.
    #[error("{0}")]
    Validation(String),
    /// The deployment boundary failed; message is the user-facing text.
    #[error("{0}")]
    Deployment(String),
}

/// Fixed user-facing message for each failure category.
///
/// The match is exhaustive so a new category cannot ship without a message;
/// only `Other` carries raw error text through.
pub fn user_message(kind: DeployErrorKind, raw: &str) -> String {
    match kind {
        DeployErrorKind::InsufficientFunds => {
            "Insufficient funds to create coin. You need ETH for gas fees.".to_string()
        }
        DeployErrorKind::UserRejected => "Transaction was rejected in the wallet.".to_string(),
        DeployErrorKind::InvalidRecipient => {
            "Invalid payout recipient address in environment variables.".to_string()
        }
        DeployErrorKind::InvalidCredential => {
            "Invalid private key or API key in environment variables.".to_string()
        }
        DeployErrorKind::MissingConfiguration => {
            "Missing required environment variables. Please check your configuration.".to_string()
        }
        DeployErrorKind::Other => format!("Failed to create quiz coin: {}", raw),
    }
}

/// The coin-creation workflow.
///
/// Owns the append-only list of quizzes created this session. Methods take
/// `&self`; state lives behind a lock so the in-flight gate holds even when
/// the workflow is shared.
pub struct CoinCreationWorkflow {
    deployer: Arc<dyn CoinDeployer>,
    wallet: Option<Arc<dyn WalletSession>>,
    chain: ChainTarget,
    gas: GasPolicy,
    state: Mutex<WorkflowState>,
    created: Mutex<Vec<CreatedQuiz>>,
}

impl CoinCreationWorkflow {
    pub fn new(deployer: Arc<dyn CoinDeployer>) -> Self {
        Self {
            deployer,
            wallet: None,
            chain: ChainTarget::Base,
            gas: GasPolicy::default(),
            state: Mutex::new(WorkflowState::Form { error: None }),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Use a connected wallet session as the signer instead of the
    /// configured private key.
    pub fn with_wallet(mut self, session: Arc<dyn WalletSession>) -> Self {
        self.wallet = Some(session);
        self
    }

    pub fn with_chain(mut self, chain: ChainTarget) -> Self {
        self.chain = chain;
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WorkflowState {
        lock(&self.state).clone()
    }

    /// Quizzes created this session, in creation order.
    pub fn created_quizzes(&self) -> Vec<CreatedQuiz> {
        lock(&self.created).clone()
    }

    /// Explicit user action returning to the form for another attempt.
    /// Ignored while a submission is in flight.
    pub fn return_to_form(&self) {
        let mut state = lock(&self.state);
        if !state.is_creating() {
            *state = WorkflowState::Form { error: None };
        }
    }

    /// Drive one quiz definition through deployment.
    ///
    /// Preconditions are checked before any side effect; each call that
    /// passes them produces exactly one chain submission.
    pub async fn submit(
        &self,
        quiz: &QuizDefinition,
        config: &DeployConfig,
        identity: Option<&Identity>,
    ) -> Result<CreatedQuiz, SubmitError> {
        // Precondition checks and the transition to Creating happen under
        // one lock so a concurrent submit cannot slip between them.
        let deployment = {
            let mut state = lock(&self.state);
            if state.is_creating() {
                return Err(SubmitError::InFlight);
            }

            if let Err(e) = quiz.validate() {
                let message = e.to_string();
                *state = WorkflowState::Form {
                    error: Some(message.clone()),
                };
                return Err(SubmitError::Validation(message));
            }

            if let Err(e) = config.validate() {
                let message = e.to_string();
                *state = WorkflowState::Form {
                    error: Some(message.clone()),
                };
                return Err(SubmitError::Validation(message));
            }

            let recipient: EvmAddress = match config.payout_recipient.parse() {
                Ok(address) => address,
                Err(_) => {
                    let message = user_message(DeployErrorKind::InvalidRecipient, "");
                    *state = WorkflowState::Form {
                        error: Some(message.clone()),
                    };
                    return Err(SubmitError::Validation(message));
                }
            };

            *state = WorkflowState::Creating;
            self.build_deployment(quiz, recipient)
        };

        info!(
            "Creating quiz coin {} ({}) on {}",
            deployment.name, deployment.symbol, self.chain
        );

        let result = self.run_deployment(&deployment, config).await;

        match result {
            Ok(receipt) => {
                let record = self.record_success(quiz, identity, &receipt);
                *lock(&self.state) = WorkflowState::Success {
                    record: record.clone(),
                };
                info!(
                    "Quiz coin created: {} (tx {})",
                    record.coin_address, record.tx_hash
                );
                Ok(record)
            }
            Err(e) => {
                warn!("Coin creation failed ({:?}): {}", e.kind, e.message);
                let message = user_message(e.kind, &e.message);
                *lock(&self.state) = WorkflowState::Form {
                    error: Some(message.clone()),
                };
                Err(SubmitError::Deployment(message))
            }
        }
    }

    /// Deterministic deployment request for a validated definition.
    fn build_deployment(&self, quiz: &QuizDefinition, recipient: EvmAddress) -> CoinDeployment {
        CoinDeployment {
            name: quiz.name.clone(),
            symbol: quiz.symbol.clone(),
            uri: content_uri(quiz.description.as_deref()),
            payout_recipient: recipient,
            chain_id: self.chain.id(),
            currency: DeployCurrency::Zora,
        }
    }

    async fn run_deployment(
        &self,
        deployment: &CoinDeployment,
        config: &DeployConfig,
    ) -> Result<DeploymentReceipt, DeployError> {
        let signer = self.resolve_signer(config)?;
        self.deployer
            .submit_deployment(deployment, signer.as_ref(), self.gas)
            .await
    }

    /// Pick the signing capability: a connected wallet when available,
    /// otherwise the private key from configuration.
    fn resolve_signer(&self, config: &DeployConfig) -> Result<Box<dyn TransactionSigner>, DeployError> {
        if let Some(session) = &self.wallet {
            if session.status() == chains::evm::ConnectionStatus::Connected {
                return Ok(Box::new(WalletSigner::new(session.clone())));
            }
        }

        let signer = PrivateKeySigner::from_hex(&config.private_key)?;
        Ok(Box::new(signer))
    }

    fn record_success(
        &self,
        quiz: &QuizDefinition,
        identity: Option<&Identity>,
        receipt: &DeploymentReceipt,
    ) -> CreatedQuiz {
        let record = CreatedQuiz {
            id: receipt.coin_address.to_checksum(),
            name: quiz.name.clone(),
            symbol: quiz.symbol.clone(),
            coin_address: receipt.coin_address.to_checksum(),
            tx_hash: receipt.tx_hash.to_string(),
            creator: receipt.deployer.to_checksum(),
            creator_fid: identity.map(|i| i.fid),
            created: Utc::now(),
        };

        lock(&self.created).push(record.clone());
        record
    }
}

/// Lock helper that shrugs off poisoning; workflow state stays usable even if
/// a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chains::evm::TxHash;

    use super::*;

    struct MockDeployer {
        calls: AtomicUsize,
        fail_with: Option<DeployError>,
    }

    impl MockDeployer {
        fn succeeding() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: None,
            }
        }

        fn failing(kind: DeployErrorKind, message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(DeployError::new(kind, message)),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CoinDeployer for MockDeployer {
        async fn submit_deployment(
            &self,
            _deployment: &CoinDeployment,
            signer: &dyn TransactionSigner,
            _gas: GasPolicy,
        ) -> Result<DeploymentReceipt, DeployError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(error) => Err(error.clone()),
                None => Ok(DeploymentReceipt {
                    coin_address: "0x00000000000000000000000000000000000000aa"
                        .parse()
                        .unwrap(),
                    tx_hash: TxHash("0xfeed".to_string()),
                    deployer: signer.address(),
                }),
            }
        }
    }

    // Hardhat/anvil test key.
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn config() -> DeployConfig {
        DeployConfig {
            api_key: "zora-key".to_string(),
            private_key: TEST_KEY.to_string(),
            rpc_url: "http://localhost:8545".to_string(),
            payout_recipient: "0x0000000000000000000000000000000000000001".to_string(),
        }
    }

    fn quiz() -> QuizDefinition {
        QuizDefinition::new("Crypto Quiz", "CRYPTO")
    }

    #[tokio::test]
    async fn test_empty_name_never_reaches_deployer() {
        let deployer = Arc::new(MockDeployer::succeeding());
        let workflow = CoinCreationWorkflow::new(deployer.clone());

        let result = workflow
            .submit(&QuizDefinition::new("", "CRYPTO"), &config(), None)
            .await;

        assert!(matches!(result, Err(SubmitError::Validation(_))));
        assert_eq!(deployer.calls(), 0);
        assert!(workflow.state().error().is_some());
    }

    #[tokio::test]
    async fn test_missing_credentials_never_reach_deployer() {
        let deployer = Arc::new(MockDeployer::succeeding());
        let workflow = CoinCreationWorkflow::new(deployer.clone());

        let mut bad_config = config();
        bad_config.api_key = String::new();

        let result = workflow.submit(&quiz(), &bad_config, None).await;

        assert!(matches!(result, Err(SubmitError::Validation(_))));
        assert_eq!(deployer.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_recipient_aborts_before_submission() {
        let deployer = Arc::new(MockDeployer::succeeding());
        let workflow = CoinCreationWorkflow::new(deployer.clone());

        let mut bad_config = config();
        bad_config.payout_recipient = "not-an-address".to_string();

        let result = workflow.submit(&quiz(), &bad_config, None).await;

        assert!(matches!(result, Err(SubmitError::Validation(_))));
        assert_eq!(deployer.calls(), 0);
        assert_eq!(
            workflow.state().error(),
            Some("Invalid payout recipient address in environment variables.")
        );
    }

    #[tokio::test]
    async fn test_successful_submission_records_quiz() {
        let deployer = Arc::new(MockDeployer::succeeding());
        let workflow = CoinCreationWorkflow::new(deployer.clone());

        let record = workflow.submit(&quiz(), &config(), None).await.unwrap();

        assert_eq!(deployer.calls(), 1);
        assert_eq!(record.tx_hash, "0xfeed");
        assert_eq!(workflow.created_quizzes().len(), 1);
        assert!(matches!(workflow.state(), WorkflowState::Success { .. }));
    }

    #[tokio::test]
    async fn test_insufficient_funds_maps_to_fixed_message() {
        let deployer = Arc::new(MockDeployer::failing(
            DeployErrorKind::InsufficientFunds,
            "insufficient funds for gas * price + value",
        ));
        let workflow = CoinCreationWorkflow::new(deployer);

        let err = workflow.submit(&quiz(), &config(), None).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Insufficient funds to create coin. You need ETH for gas fees."
        );
        assert_eq!(
            workflow.state().error(),
            Some("Insufficient funds to create coin. You need ETH for gas fees.")
        );
    }

    #[tokio::test]
    async fn test_unknown_error_keeps_raw_text() {
        let deployer = Arc::new(MockDeployer::failing(
            DeployErrorKind::Other,
            "execution reverted: novel failure",
        ));
        let workflow = CoinCreationWorkflow::new(deployer);

        let err = workflow.submit(&quiz(), &config(), None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to create quiz coin: execution reverted: novel failure"
        );
    }

    #[tokio::test]
    async fn test_return_to_form_clears_error() {
        let deployer = Arc::new(MockDeployer::failing(DeployErrorKind::Other, "boom"));
        let workflow = CoinCreationWorkflow::new(deployer);

        let _ = workflow.submit(&quiz(), &config(), None).await;
        assert!(workflow.state().error().is_some());

        workflow.return_to_form();
        assert_eq!(workflow.state(), WorkflowState::Form { error: None });
    }

    #[test]
    fn test_user_messages_cover_every_kind() {
        let kinds = [
            DeployErrorKind::InsufficientFunds,
            DeployErrorKind::UserRejected,
            DeployErrorKind::InvalidRecipient,
            DeployErrorKind::InvalidCredential,
            DeployErrorKind::MissingConfiguration,
        ];
        for kind in kinds {
            let message = user_message(kind, "raw");
            assert!(!message.is_empty());
            assert!(!message.contains("raw"));
        }

        assert_eq!(
            user_message(DeployErrorKind::Other, "raw"),
            "Failed to create quiz coin: raw"
        );
    }
}
