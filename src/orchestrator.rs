//! The flow orchestrator: given an account, a minimum-validity requirement, an optional scope
//! override, and a caller-configured flow order, selects and runs flows in order until one
//! succeeds or all have been rejected.

use tracing::{debug, info, warn};

use crate::account::{now, Account};
use crate::discovery;
use crate::error::{OidcError, Result};
use crate::flow_order::{Flow, FlowOrder};
use crate::http::HttpTransport;
use crate::ipc::{GrantDelivery, NoPrompt, PromptChannel};

/// Sentinel for `min_valid_period` that disables the cache short-circuit and forces a fresh flow
/// run regardless of the cached access token's remaining validity.
pub const FORCE_NEW_TOKEN: i64 = -1;

/// A request for an access token: how long it must remain valid, an optional scope override, an
/// optional explicit flow order for this call only, and an optional externally-obtained grant
/// payload (a `code` or `device_code`) the caller already has in hand.
#[derive(Debug, Default)]
pub struct TokenRequest<'a> {
    pub min_valid_period: i64,
    pub scope_override: Option<&'a str>,
    pub flow_order: Option<&'a FlowOrder>,
    pub grant: Option<GrantDelivery>,
}

impl<'a> TokenRequest<'a> {
    /// A plain cache-or-refresh request with no scope override, explicit order, or grant payload.
    pub fn new(min_valid_period: i64) -> Self {
        TokenRequest {
            min_valid_period,
            scope_override: None,
            flow_order: None,
            grant: None,
        }
    }
}

/// The central entry point. Returns a valid access token, or the most informative error
/// encountered while trying to obtain one.
///
/// Before any flow runs, discovery is performed if the account's issuer metadata has not yet been
/// populated (discovery is idempotent and cheap to skip on subsequent calls once populated).
pub async fn get_access_token(
    account: &mut Account,
    transport: &dyn HttpTransport,
    request: TokenRequest<'_>,
) -> Result<String> {
    get_access_token_with_prompt(account, transport, request, &NoPrompt).await
}

/// As [`get_access_token`], but with an explicit [`PromptChannel`] the password flow may use to
/// ask the caller for a password interactively when none is cached.
pub async fn get_access_token_with_prompt(
    account: &mut Account,
    transport: &dyn HttpTransport,
    request: TokenRequest<'_>,
    prompt: &dyn PromptChannel,
) -> Result<String> {
    let at = now();

    // 1. Cache short-circuit.
    if request.scope_override.is_none()
        && request.min_valid_period != FORCE_NEW_TOKEN
        && account.tokens.access_token_present(at)
        && account.tokens.remaining_validity(at) > request.min_valid_period
    {
        debug!(account = %account.name, "returning cached access token");
        return Ok(account.tokens.access_token.expose().to_owned());
    }

    // Ensure issuer metadata is populated; partial population is never observable because
    // `discover` only ever writes the metadata block as a single atomic assignment.
    if account.issuer_metadata.is_none() {
        discovery::discover(account, transport).await?;
    }

    // 2. Flow selection.
    let order = request
        .flow_order
        .cloned()
        .or_else(|| account.configured_flow_order().cloned())
        .unwrap_or_default();

    // 3. Sequential attempt, 4. termination.
    let mut most_specific_skip: Option<OidcError> = None;

    for flow in order.iter() {
        let outcome = run_one(account, transport, &request, flow, prompt).await;
        match outcome {
            Ok(token) => {
                info!(account = %account.name, %flow, "access token acquired");
                return Ok(token);
            }
            Err(err) if err.is_skip() => {
                debug!(account = %account.name, %flow, error = %err, "flow skipped");
                most_specific_skip = Some(match most_specific_skip {
                    Some(previous) => previous.more_specific_skip(err),
                    None => err,
                });
            }
            Err(hard_failure) => {
                // A hard failure stops the fallback chain immediately: silently escalating from
                // e.g. refresh to an interactive prompt would surprise the caller.
                warn!(account = %account.name, %flow, error = %hard_failure, "flow failed, not trying further flows");
                return Err(hard_failure);
            }
        }
    }

    Err(most_specific_skip.unwrap_or(OidcError::NoFlowAvailable))
}

async fn run_one(
    account: &mut Account,
    transport: &dyn HttpTransport,
    request: &TokenRequest<'_>,
    flow: Flow,
    prompt: &dyn PromptChannel,
) -> Result<String> {
    match flow {
        Flow::Refresh => crate::flows::refresh::run(account, transport, request.scope_override).await,
        Flow::Password => {
            crate::flows::password::run(account, transport, request.scope_override, prompt).await
        }
        Flow::Code => match &request.grant {
            Some(GrantDelivery::Code {
                code,
                redirect_uri,
                code_verifier,
            }) => {
                crate::flows::code::run(
                    account,
                    transport,
                    code,
                    redirect_uri,
                    code_verifier.as_deref(),
                )
                .await
            }
            _ => Err(OidcError::NoFlowAvailable),
        },
        Flow::Device => match &request.grant {
            Some(GrantDelivery::Device { device_code }) => {
                crate::flows::device::run(account, transport, device_code).await
            }
            _ => Err(OidcError::NoFlowAvailable),
        },
    }
}
