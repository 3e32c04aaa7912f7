//! The credential lifetime policy: sweeping expired accounts out of the store and expired
//! passwords out of otherwise-live accounts.
//!
//! Two independent deadlines govern an [`Account`]: `death`, after which the account itself is
//! unloaded (secrets wiped, entry removed), and `pw_death`, after which only the stored password
//! is wiped while the rest of the account stays loaded and usable via the refresh flow.

use tracing::debug;

use crate::account::{now, Account, UnixTime};

/// The outcome of one [`sweep`] pass over a single account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The account's `death` deadline passed; it must be removed from the store.
    Unloaded,
    /// The account's `pw_death` deadline passed; its password was wiped but it remains loaded.
    PasswordWiped,
    /// Neither deadline has passed; no action was taken.
    Unchanged,
}

/// Apply the lifetime policy to a single account as of `at`. Returns [`SweepOutcome::Unloaded`] if
/// the caller must now remove `account` from its store; the account's secrets have already been
/// wiped in that case, so it is safe to drop without a further call.
pub fn sweep(account: &mut Account, at: UnixTime) -> SweepOutcome {
    if account.is_expired(at) {
        debug!(account = %account.name, "death deadline passed, unloading account");
        account.wipe_secrets();
        return SweepOutcome::Unloaded;
    }

    if account.pw_death != 0 && account.pw_death <= at && account.credentials.password.is_some() {
        debug!(account = %account.name, "pw_death deadline passed, wiping password");
        account.wipe_password();
        return SweepOutcome::PasswordWiped;
    }

    SweepOutcome::Unchanged
}

/// Apply the lifetime policy to every account in `accounts` as of the current time, returning the
/// names of the accounts that were unloaded. Callers own removing those names from their store;
/// this function only mutates in place and reports what happened.
pub fn sweep_all<'a, I>(accounts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a mut Account>,
{
    let at = now();
    let mut unloaded = Vec::new();
    for account in accounts {
        if sweep(account, at) == SweepOutcome::Unloaded {
            unloaded.push(account.name.clone());
        }
    }
    unloaded
}

/// Set `account`'s password, refreshing `pw_death` to `at + ttl` (or `0`, meaning "forever", if
/// `ttl` is `0`). Matches the write-then-restart-the-clock semantics of a fresh password prompt.
pub fn touch_password(account: &mut Account, password: impl Into<crate::secret::Secret>, ttl: i64, at: UnixTime) {
    account.credentials.password = Some(password.into());
    account.pw_death = if ttl == 0 { 0 } else { at + ttl };
}

/// Explicitly clear a password ahead of its scheduled `pw_death`, e.g. in response to an
/// `invalid_grant` from the password flow itself.
pub fn clear_password(account: &mut Account) {
    account.wipe_password();
    account.pw_death = 0;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::secret::Secret;

    fn account() -> Account {
        Account::new("test", "https://issuer.example", "client")
    }

    #[test]
    fn test_sweep_unchanged_when_no_deadlines_set() {
        let mut a = account();
        assert_eq!(sweep(&mut a, now()), SweepOutcome::Unchanged);
    }

    #[test]
    fn test_sweep_unloads_on_death() {
        let mut a = account();
        a.tokens.access_token = Secret::new("AT1");
        a.death = now() - 1;

        assert_eq!(sweep(&mut a, now()), SweepOutcome::Unloaded);
        assert!(a.tokens.access_token.is_empty());
    }

    #[test]
    fn test_sweep_wipes_password_but_keeps_account() {
        let mut a = account();
        a.credentials.username = Some("alice".into());
        a.credentials.password = Some(Secret::new("hunter2"));
        a.tokens.refresh_token = Secret::new("RT1");
        a.pw_death = now() - 1;

        assert_eq!(sweep(&mut a, now()), SweepOutcome::PasswordWiped);
        assert!(a.credentials.password.is_none());
        // The account itself, and its unrelated refresh token, survive.
        assert!(!a.tokens.refresh_token.is_empty());
    }

    #[test]
    fn test_sweep_all_reports_unloaded_names() {
        let mut a1 = account();
        a1.name = "a1".into();
        a1.death = now() - 1;
        let mut a2 = account();
        a2.name = "a2".into();

        let unloaded = sweep_all([&mut a1, &mut a2]);
        assert_eq!(unloaded, vec!["a1".to_string()]);
    }

    #[test]
    fn test_touch_password_sets_ttl() {
        let mut a = account();
        touch_password(&mut a, "hunter2", 60, now());
        assert_eq!(a.get_password(now()), Some("hunter2"));
        assert!(a.pw_death > now());
    }

    #[test]
    fn test_touch_password_forever_when_ttl_zero() {
        let mut a = account();
        touch_password(&mut a, "hunter2", 0, now());
        assert_eq!(a.pw_death, 0);
    }

    #[test]
    fn test_clear_password() {
        let mut a = account();
        touch_password(&mut a, "hunter2", 60, now());
        clear_password(&mut a);
        assert!(a.get_password(now()).is_none());
        assert_eq!(a.pw_death, 0);
    }
}
