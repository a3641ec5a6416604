//! The top-up flow state machine.
//!
//! [`TopUpFlow`] owns everything the top-up card on the console page keeps
//! in component state: the entered amount, the selected payment provider,
//! the last known quota, and the flow stage. It is the one real state
//! machine in the SDK:
//!
//! ```text
//! Idle -- submit() --> Submitting --> Redirecting
//!                          |
//!                          +--> QrPending -- cancel_qr() / confirm_paid() --> Idle
//!                          |
//!                          +--> Idle            (business or transport failure)
//! ```
//!
//! There is no server-driven transition: the QR stage closes only on a
//! user-declared outcome, and `confirm_paid` trusts that declaration
//! without a settlement check (the next page load's quota fetch is the
//! reconciliation point).

use crate::amount::TopUpAmount;
use crate::api::ConsoleApi;
use crate::notice::{Notice, Notifier};
use crate::page::Page;
use crate::payment::PaymentLink;
use crate::proto::{ChargeRequest, PayProvider};
use crate::quota::format_quota;

/// Info notice shown when submit is pressed with no amount entered.
pub const MSG_EMPTY_AMOUNT: &str = "please enter a top-up amount";

/// Success notice shown once the backend created a payment link.
pub const MSG_LINK_CREATED: &str = "top-up link created";

/// Error notice shown when the charge request never completed.
pub const MSG_REQUEST_FAILED: &str = "request failed";

/// Error notice shown when the backend returned an unusable payment link.
pub const MSG_BAD_PAY_LINK: &str = "received a malformed payment link";

/// Success notice shown when the page returns from a completed provider
/// checkout.
pub const MSG_TRADE_SUCCESS: &str = "top-up successful";

/// Query parameter a provider redirect appends on successful checkout.
const TRADE_STATUS_PARAM: &str = "trade_status";

/// Value of [`TRADE_STATUS_PARAM`] that signals a completed checkout.
const TRADE_STATUS_SUCCESS: &str = "TRADE_SUCCESS";

/// A pending QR payment: what the confirmation dialog renders.
///
/// Carries only what the dialog needs: the wallet deep link to show as a
/// scannable code and the amount to echo back for user confirmation. It
/// owns no state beyond its place in [`Stage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayment {
    payload: String,
    amount: TopUpAmount,
}

impl QrPayment {
    /// The wallet deep link, byte-for-byte as the backend sent it.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The amount the user asked to top up.
    #[must_use]
    pub const fn amount(&self) -> TopUpAmount {
        self.amount
    }
}

/// Where the flow currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Stage {
    /// Ready for input; every failure path returns here.
    #[default]
    Idle,

    /// A charge request is in flight; submission is disabled.
    Submitting,

    /// A payment link was created for a wallet deep link; the QR
    /// confirmation dialog is open.
    QrPending(QrPayment),

    /// A payment link was created for a web URL and the page was sent
    /// there; this view is being abandoned.
    Redirecting,
}

impl Stage {
    /// Whether a charge request is currently in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

/// The top-up flow controller.
///
/// Exclusively owns the charge request fields and the settled/in-progress
/// response state. All collaborators are injected: the console API client,
/// the hosting [`Page`], and the [`Notifier`] for transient messages.
#[derive(Debug)]
pub struct TopUpFlow<A, P, N> {
    api: A,
    page: P,
    notifier: N,
    amount: Option<TopUpAmount>,
    provider: PayProvider,
    quota: i64,
    stage: Stage,
}

impl<A, P, N> TopUpFlow<A, P, N>
where
    A: ConsoleApi,
    P: Page,
    N: Notifier,
{
    /// Creates a flow in its initial state: default amount pre-filled,
    /// WeChat Pay selected, quota unknown (rendered as zero), Idle stage.
    pub fn new(api: A, page: P, notifier: N) -> Self {
        Self {
            api,
            page,
            notifier,
            amount: Some(TopUpAmount::DEFAULT),
            provider: PayProvider::default(),
            quota: 0,
            stage: Stage::Idle,
        }
    }

    /// The currently entered amount, if any.
    #[must_use]
    pub const fn amount(&self) -> Option<TopUpAmount> {
        self.amount
    }

    /// The selected payment provider.
    #[must_use]
    pub const fn provider(&self) -> PayProvider {
        self.provider
    }

    /// The last successfully fetched quota, in backend units.
    #[must_use]
    pub const fn quota(&self) -> i64 {
        self.quota
    }

    /// The quota rendered as a currency string.
    #[must_use]
    pub fn formatted_quota(&self) -> String {
        format_quota(self.quota)
    }

    /// The current flow stage.
    #[must_use]
    pub const fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Whether a charge request is currently in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.stage.is_submitting()
    }

    /// The pending QR payment, when the confirmation dialog is open.
    #[must_use]
    pub const fn qr_payment(&self) -> Option<&QrPayment> {
        match &self.stage {
            Stage::QrPending(qr) => Some(qr),
            _ => None,
        }
    }

    /// Applies raw text from the amount input.
    ///
    /// Numeric input is clamped into the accepted range; empty or
    /// non-numeric input clears the amount, which [`Self::submit`] rejects.
    pub fn set_amount_input(&mut self, input: &str) {
        self.amount = TopUpAmount::parse(input);
    }

    /// Sets an already validated amount.
    pub fn set_amount(&mut self, amount: TopUpAmount) {
        self.amount = Some(amount);
    }

    /// Selects the payment provider.
    pub fn set_provider(&mut self, provider: PayProvider) {
        self.provider = provider;
    }

    /// Submits the charge request and drives the response branch.
    ///
    /// With no amount entered, an info notice is shown and no request is
    /// issued. Otherwise the stage is `Submitting` for the whole
    /// request/response cycle; once the response is fully processed (notice
    /// shown, branch taken) the stage settles on `Redirecting`,
    /// `QrPending`, or back to `Idle`. Calling submit while already
    /// submitting is a no-op. The stage is never left at `Submitting`, on
    /// any path.
    pub async fn submit(&mut self) -> Stage {
        if self.stage.is_submitting() {
            return self.stage.clone();
        }
        let Some(amount) = self.amount else {
            self.notifier.notify(Notice::info(MSG_EMPTY_AMOUNT));
            return self.stage.clone();
        };

        let request = ChargeRequest {
            amount,
            provider: self.provider,
        };
        self.stage = Stage::Submitting;

        self.stage = match self.api.recharge(&request).await {
            Ok(response) if response.success => {
                self.notifier.notify(Notice::success(MSG_LINK_CREATED));
                self.amount = Some(TopUpAmount::DEFAULT);
                self.follow_payment_link(&response.payurl, amount)
            }
            Ok(response) => {
                self.notifier.notify(Notice::error(response.message));
                Stage::Idle
            }
            Err(error) => {
                log_request_failure("POST /api/user/recharge", &error);
                self.notifier.notify(Notice::error(MSG_REQUEST_FAILED));
                Stage::Idle
            }
        };
        self.stage.clone()
    }

    /// Branches on the payment link of a successful charge response.
    fn follow_payment_link(&self, payurl: &str, amount: TopUpAmount) -> Stage {
        match PaymentLink::classify(payurl) {
            Ok(PaymentLink::Redirect(url)) => {
                if let Err(error) = self.page.navigate(url.as_str()) {
                    log_request_failure("redirect navigation", &error);
                }
                Stage::Redirecting
            }
            Ok(PaymentLink::QrPayment { payload }) => {
                // Best effort: an installed wallet may pick the deep link up
                // directly. The QR dialog is the fallback either way.
                if let Err(error) = self.page.navigate(&payload) {
                    log_request_failure("wallet deep link navigation", &error);
                }
                Stage::QrPending(QrPayment { payload, amount })
            }
            Err(error) => {
                log_request_failure("payment link classification", &error);
                self.notifier.notify(Notice::error(MSG_BAD_PAY_LINK));
                Stage::Idle
            }
        }
    }

    /// Fetches the current quota.
    ///
    /// Quota display is non-critical: a business failure surfaces the
    /// server message, a transport failure is silent, and in both cases the
    /// previously displayed value stays untouched.
    pub async fn load_quota(&mut self) {
        match self.api.user_self().await {
            Ok(envelope) => match envelope.into_data() {
                Ok(user) => self.quota = user.quota,
                Err(message) => self.notifier.notify(Notice::error(message)),
            },
            Err(error) => log_request_failure("GET /api/user/self", &error),
        }
    }

    /// Closes the QR confirmation dialog without any network call.
    pub fn cancel_qr(&mut self) {
        if matches!(self.stage, Stage::QrPending(_)) {
            self.stage = Stage::Idle;
        }
    }

    /// Records the user's declaration that the QR payment went through.
    ///
    /// Closes the dialog and asks the hosting page for a full reload; the
    /// fresh page's quota fetch is what reflects the new balance. No
    /// settlement verification is performed; the declaration is trusted
    /// as-is.
    pub fn confirm_paid(&mut self) {
        if !matches!(self.stage, Stage::QrPending(_)) {
            return;
        }
        self.stage = Stage::Idle;
        if let Err(error) = self.page.reload() {
            log_request_failure("page reload", &error);
        }
    }

    /// Inspects the query string of a page entered from a provider
    /// redirect and announces a completed checkout.
    ///
    /// Providers send the user back with `trade_status=TRADE_SUCCESS`
    /// appended; anything else is ignored.
    pub fn handle_return_query(&self, query: &str) {
        let completed = url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .any(|(key, value)| key == TRADE_STATUS_PARAM && value == TRADE_STATUS_SUCCESS);
        if completed {
            self.notifier.notify(Notice::success(MSG_TRADE_SUCCESS));
        }
    }
}

#[cfg(feature = "telemetry")]
fn log_request_failure(context: &'static str, error: &dyn std::fmt::Display) {
    tracing::debug!(%error, context, "top-up flow step failed");
}

#[cfg(not(feature = "telemetry"))]
fn log_request_failure(_context: &'static str, _error: &dyn std::fmt::Display) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;
    use crate::page::PageError;
    use crate::proto::{ChargeResponse, Envelope, TokenPage, TokenQuery, UserQuota};
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct StubError;

    #[derive(Default)]
    struct StubApi {
        recharge_calls: AtomicUsize,
        recharge_response: Option<ChargeResponse>,
        quota_response: Mutex<Option<Envelope<UserQuota>>>,
    }

    impl StubApi {
        fn charging(payurl: &str) -> Self {
            Self {
                recharge_response: Some(ChargeResponse {
                    success: true,
                    message: String::new(),
                    payurl: payurl.to_owned(),
                }),
                ..Self::default()
            }
        }

        fn rejecting(message: &str) -> Self {
            Self {
                recharge_response: Some(ChargeResponse {
                    success: false,
                    message: message.to_owned(),
                    payurl: String::new(),
                }),
                ..Self::default()
            }
        }

        fn with_quota(quota: i64) -> Self {
            Self {
                quota_response: Mutex::new(Some(Envelope {
                    success: true,
                    message: String::new(),
                    data: Some(UserQuota { quota }),
                })),
                ..Self::default()
            }
        }
    }

    impl ConsoleApi for Arc<StubApi> {
        type Error = StubError;

        async fn user_self(&self) -> Result<Envelope<UserQuota>, Self::Error> {
            self.quota_response.lock().unwrap().clone().ok_or(StubError)
        }

        async fn recharge(&self, _request: &ChargeRequest) -> Result<ChargeResponse, Self::Error> {
            self.recharge_calls.fetch_add(1, Ordering::SeqCst);
            self.recharge_response.clone().ok_or(StubError)
        }

        async fn tokens(&self, _query: &TokenQuery) -> Result<Envelope<TokenPage>, Self::Error> {
            Err(StubError)
        }

        async fn aff_code(&self) -> Result<Envelope<String>, Self::Error> {
            Err(StubError)
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum PageAction {
        Navigate(String),
        Reload,
    }

    #[derive(Default)]
    struct StubPage {
        actions: Mutex<Vec<PageAction>>,
        deny_navigation: bool,
    }

    impl StubPage {
        fn denying_navigation() -> Self {
            Self {
                deny_navigation: true,
                ..Self::default()
            }
        }

        fn actions(&self) -> Vec<PageAction> {
            self.actions.lock().unwrap().clone()
        }
    }

    impl Page for Arc<StubPage> {
        fn navigate(&self, url: &str) -> Result<(), PageError> {
            if self.deny_navigation {
                return Err(PageError::new("navigation blocked"));
            }
            self.actions
                .lock()
                .unwrap()
                .push(PageAction::Navigate(url.to_owned()));
            Ok(())
        }

        fn reload(&self) -> Result<(), PageError> {
            self.actions.lock().unwrap().push(PageAction::Reload);
            Ok(())
        }

        fn origin(&self) -> String {
            "https://console.example".to_owned()
        }

        fn copy_text(&self, _text: &str) -> Result<(), PageError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotifier {
        fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }
    }

    impl Notifier for Arc<RecordingNotifier> {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    type TestFlow = TopUpFlow<Arc<StubApi>, Arc<StubPage>, Arc<RecordingNotifier>>;

    fn flow_with(api: StubApi) -> (TestFlow, Arc<StubApi>, Arc<StubPage>, Arc<RecordingNotifier>) {
        flow_with_page(api, StubPage::default())
    }

    fn flow_with_page(
        api: StubApi,
        page: StubPage,
    ) -> (TestFlow, Arc<StubApi>, Arc<StubPage>, Arc<RecordingNotifier>) {
        let api = Arc::new(api);
        let page = Arc::new(page);
        let notifier = Arc::new(RecordingNotifier::default());
        let flow = TopUpFlow::new(Arc::clone(&api), Arc::clone(&page), Arc::clone(&notifier));
        (flow, api, page, notifier)
    }

    #[test]
    fn test_initial_state() {
        let (flow, _, _, _) = flow_with(StubApi::default());
        assert_eq!(flow.amount(), Some(TopUpAmount::DEFAULT));
        assert_eq!(flow.provider(), PayProvider::Wechat);
        assert_eq!(flow.quota(), 0);
        assert_eq!(flow.formatted_quota(), "$0.00");
        assert_eq!(*flow.stage(), Stage::Idle);
        assert!(!flow.is_submitting());
    }

    #[tokio::test]
    async fn test_submit_without_amount_issues_no_request() {
        let (mut flow, api, _, notifier) = flow_with(StubApi::charging("https://pay.example/1"));
        flow.set_amount_input("");

        let stage = flow.submit().await;

        assert_eq!(stage, Stage::Idle);
        assert_eq!(api.recharge_calls.load(Ordering::SeqCst), 0);
        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Info);
        assert_eq!(notices[0].text, MSG_EMPTY_AMOUNT);
    }

    #[tokio::test]
    async fn test_redirect_flow_navigates_and_never_opens_qr() {
        let (mut flow, _, page, notifier) = flow_with(StubApi::charging("https://pay.example/o/9"));

        let stage = flow.submit().await;

        assert_eq!(stage, Stage::Redirecting);
        assert_eq!(flow.qr_payment(), None);
        assert_eq!(
            page.actions(),
            [PageAction::Navigate("https://pay.example/o/9".to_owned())]
        );
        let notices = notifier.notices();
        assert_eq!(notices[0].kind, NoticeKind::Success);
        assert_eq!(notices[0].text, MSG_LINK_CREATED);
    }

    #[tokio::test]
    async fn test_wallet_deep_link_opens_qr_and_attempts_navigation() {
        let payurl = "weixin://wxpay/bizpayurl?pr=abcdef";
        let (mut flow, _, page, _) = flow_with(StubApi::charging(payurl));
        flow.set_amount_input("12");

        let stage = flow.submit().await;

        match stage {
            Stage::QrPending(ref qr) => {
                assert_eq!(qr.payload(), payurl);
                assert_eq!(qr.amount().get(), 12);
            }
            other => panic!("expected QR stage, got {other:?}"),
        }
        // The deep link is still handed to the page, best effort.
        assert_eq!(page.actions(), [PageAction::Navigate(payurl.to_owned())]);
    }

    #[tokio::test]
    async fn test_blocked_navigation_leaves_qr_stage_intact() {
        let payurl = "weixin://wxpay/bizpayurl?pr=abcdef";
        let (mut flow, _, page, _) =
            flow_with_page(StubApi::charging(payurl), StubPage::denying_navigation());

        let stage = flow.submit().await;

        assert!(matches!(stage, Stage::QrPending(_)));
        assert!(page.actions().is_empty());
    }

    #[tokio::test]
    async fn test_business_failure_keeps_amount_and_provider() {
        let (mut flow, _, page, notifier) = flow_with(StubApi::rejecting("amount not allowed"));
        flow.set_amount_input("30");
        flow.set_provider(PayProvider::Alipay);

        let stage = flow.submit().await;

        assert_eq!(stage, Stage::Idle);
        assert!(!flow.is_submitting());
        assert_eq!(flow.amount().map(TopUpAmount::get), Some(30));
        assert_eq!(flow.provider(), PayProvider::Alipay);
        assert!(page.actions().is_empty());
        let notices = notifier.notices();
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert_eq!(notices[0].text, "amount not allowed");
    }

    #[tokio::test]
    async fn test_transport_failure_shows_generic_notice() {
        let (mut flow, _, _, notifier) = flow_with(StubApi::default());

        let stage = flow.submit().await;

        assert_eq!(stage, Stage::Idle);
        assert!(!flow.is_submitting());
        let notices = notifier.notices();
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert_eq!(notices[0].text, MSG_REQUEST_FAILED);
    }

    #[tokio::test]
    async fn test_malformed_payurl_returns_to_idle() {
        let (mut flow, _, page, notifier) = flow_with(StubApi::charging("not a url"));

        let stage = flow.submit().await;

        assert_eq!(stage, Stage::Idle);
        assert!(page.actions().is_empty());
        let notices = notifier.notices();
        // Link creation succeeded before the branch failed.
        assert_eq!(notices[0].text, MSG_LINK_CREATED);
        assert_eq!(notices[1].kind, NoticeKind::Error);
        assert_eq!(notices[1].text, MSG_BAD_PAY_LINK);
    }

    #[tokio::test]
    async fn test_successful_submit_resets_amount() {
        let (mut flow, _, _, _) = flow_with(StubApi::charging("https://pay.example/1"));
        flow.set_amount_input("42");

        flow.submit().await;

        assert_eq!(flow.amount(), Some(TopUpAmount::DEFAULT));
    }

    #[tokio::test]
    async fn test_confirm_paid_reloads_without_network() {
        let (mut flow, api, page, _) =
            flow_with(StubApi::charging("weixin://wxpay/bizpayurl?pr=abcdef"));
        flow.submit().await;
        let calls_after_submit = api.recharge_calls.load(Ordering::SeqCst);

        flow.confirm_paid();

        assert_eq!(*flow.stage(), Stage::Idle);
        assert_eq!(api.recharge_calls.load(Ordering::SeqCst), calls_after_submit);
        assert_eq!(page.actions().last(), Some(&PageAction::Reload));
    }

    #[tokio::test]
    async fn test_cancel_qr_goes_back_to_idle_silently() {
        let (mut flow, _, page, notifier) =
            flow_with(StubApi::charging("weixin://wxpay/bizpayurl?pr=abcdef"));
        flow.submit().await;
        let actions_after_submit = page.actions().len();
        let notices_after_submit = notifier.notices().len();

        flow.cancel_qr();

        assert_eq!(*flow.stage(), Stage::Idle);
        assert_eq!(page.actions().len(), actions_after_submit);
        assert_eq!(notifier.notices().len(), notices_after_submit);
    }

    #[test]
    fn test_confirm_paid_outside_qr_stage_is_a_no_op() {
        let (mut flow, _, page, _) = flow_with(StubApi::default());
        flow.confirm_paid();
        assert_eq!(*flow.stage(), Stage::Idle);
        assert!(page.actions().is_empty());
    }

    #[tokio::test]
    async fn test_load_quota_success() {
        let (mut flow, _, _, _) = flow_with(StubApi::with_quota(1_234_567));
        flow.load_quota().await;
        assert_eq!(flow.quota(), 1_234_567);
        assert_eq!(flow.formatted_quota(), "$2.47");
    }

    #[tokio::test]
    async fn test_failed_quota_fetch_keeps_previous_value() {
        let (mut flow, api, _, notifier) = flow_with(StubApi::with_quota(500_000));
        flow.load_quota().await;
        assert_eq!(flow.quota(), 500_000);

        // The next fetch dies at the transport layer.
        *api.quota_response.lock().unwrap() = None;
        flow.load_quota().await;

        assert_eq!(flow.quota(), 500_000);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_quota_business_failure_surfaces_message() {
        let api = StubApi {
            quota_response: Mutex::new(Some(Envelope {
                success: false,
                message: "session expired".to_owned(),
                data: None,
            })),
            ..StubApi::default()
        };
        let (mut flow, _, _, notifier) = flow_with(api);

        flow.load_quota().await;

        assert_eq!(flow.quota(), 0);
        let notices = notifier.notices();
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert_eq!(notices[0].text, "session expired");
    }

    #[test]
    fn test_return_query_announces_completed_checkout() {
        let (flow, _, _, notifier) = flow_with(StubApi::default());

        flow.handle_return_query("?trade_status=TRADE_SUCCESS&out_trade_no=20240099");

        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Success);
        assert_eq!(notices[0].text, MSG_TRADE_SUCCESS);
    }

    #[test]
    fn test_return_query_ignores_other_statuses() {
        let (flow, _, _, notifier) = flow_with(StubApi::default());

        flow.handle_return_query("?trade_status=WAIT_BUYER_PAY");
        flow.handle_return_query("");

        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_amount_input_clamping_reaches_the_wire() {
        let (mut flow, _, _, _) = flow_with(StubApi::charging("https://pay.example/1"));

        flow.set_amount_input("200");
        assert_eq!(flow.amount().map(TopUpAmount::get), Some(50));

        flow.set_amount_input("-5");
        assert_eq!(flow.amount().map(TopUpAmount::get), Some(1));

        flow.set_amount_input("12");
        assert_eq!(flow.amount().map(TopUpAmount::get), Some(12));
    }
}
