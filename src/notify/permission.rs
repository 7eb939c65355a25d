use anyhow::Result;
use log::info;
use rusqlite::Connection;

use crate::db::repository::PrefsRepo;
use crate::models::Permission;

/// What happened when the user asked to turn notifications on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    /// No notification surface; nothing was asked or changed
    Unsupported,
    /// Previously refused; the user has to reset it themselves
    Blocked,
    /// Was already allowed
    AlreadyGranted,
    /// Allowed just now
    Granted,
    /// Refused just now
    Refused,
    /// Closed without an answer; still undecided
    Dismissed,
}

impl PermissionOutcome {
    /// Whether the caller should push a schedule to the worker right away
    pub fn should_schedule(self) -> bool {
        matches!(self, PermissionOutcome::AlreadyGranted | PermissionOutcome::Granted)
    }

    pub fn message(self) -> &'static str {
        match self {
            PermissionOutcome::Unsupported => "Notifications are not supported here.",
            PermissionOutcome::Blocked => {
                "Notifications are blocked. Run `namazkar notify reset` to be asked again."
            }
            PermissionOutcome::AlreadyGranted => "Notifications are already enabled.",
            PermissionOutcome::Granted => "Notifications enabled.",
            PermissionOutcome::Refused => "Notifications not enabled.",
            PermissionOutcome::Dismissed => "No answer given. You will be asked again next time.",
        }
    }
}

/// Run the enable-notifications flow. `ask` is only called when the user has
/// never answered before; it returns `None` when no answer was given. Allowing
/// turns on every prayer in `today`.
pub fn request_permission<S, F>(
    conn: &Connection,
    supported: bool,
    today: &[S],
    ask: F,
) -> Result<PermissionOutcome>
where
    S: AsRef<str>,
    F: FnOnce() -> Result<Option<bool>>,
{
    if !supported {
        return Ok(PermissionOutcome::Unsupported);
    }
    match PrefsRepo::permission(conn)? {
        Permission::Denied => Ok(PermissionOutcome::Blocked),
        Permission::Granted => {
            PrefsRepo::enable_all(conn, today)?;
            Ok(PermissionOutcome::AlreadyGranted)
        }
        Permission::Default => match ask()? {
            Some(allowed) => answer_prompt(conn, today, allowed),
            None => Ok(PermissionOutcome::Dismissed),
        },
    }
}

/// Record the user's answer to the permission prompt.
pub fn answer_prompt<S: AsRef<str>>(
    conn: &Connection,
    today: &[S],
    allowed: bool,
) -> Result<PermissionOutcome> {
    if allowed {
        PrefsRepo::set_permission(conn, Permission::Granted)?;
        PrefsRepo::enable_all(conn, today)?;
        info!("Notification permission granted");
        Ok(PermissionOutcome::Granted)
    } else {
        PrefsRepo::set_permission(conn, Permission::Denied)?;
        info!("Notification permission denied");
        Ok(PermissionOutcome::Refused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    const TODAY: [&str; 3] = ["Fajr", "Dhuhr", "Isha"];

    fn open_memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn never_asked() -> Result<Option<bool>> {
        panic!("prompt should not be shown")
    }

    #[test]
    fn test_already_granted_enables_all() {
        let conn = open_memory();
        PrefsRepo::set_permission(&conn, Permission::Granted).unwrap();
        PrefsRepo::set_enabled(&conn, "Dhuhr", false).unwrap();

        for _ in 0..2 {
            let outcome = request_permission(&conn, true, &TODAY, never_asked).unwrap();
            assert_eq!(outcome, PermissionOutcome::AlreadyGranted);
            assert!(outcome.should_schedule());
            for prayer in TODAY {
                assert!(PrefsRepo::is_enabled(&conn, prayer).unwrap());
            }
        }
    }

    #[test]
    fn test_prompt_accepted() {
        let conn = open_memory();
        let outcome = request_permission(&conn, true, &TODAY, || Ok(Some(true))).unwrap();
        assert_eq!(outcome, PermissionOutcome::Granted);
        assert_eq!(PrefsRepo::permission(&conn).unwrap(), Permission::Granted);
        assert!(PrefsRepo::is_enabled(&conn, "Isha").unwrap());
    }

    #[test]
    fn test_prompt_refused_then_blocked() {
        let conn = open_memory();
        let outcome = request_permission(&conn, true, &TODAY, || Ok(Some(false))).unwrap();
        assert_eq!(outcome, PermissionOutcome::Refused);
        assert!(!outcome.should_schedule());
        assert!(!PrefsRepo::is_enabled(&conn, "Fajr").unwrap());

        let again = request_permission(&conn, true, &TODAY, never_asked).unwrap();
        assert_eq!(again, PermissionOutcome::Blocked);
    }

    #[test]
    fn test_unsupported_changes_nothing() {
        let conn = open_memory();
        let outcome = request_permission(&conn, false, &TODAY, never_asked).unwrap();
        assert_eq!(outcome, PermissionOutcome::Unsupported);
        assert_eq!(PrefsRepo::permission(&conn).unwrap(), Permission::Default);
        assert!(PrefsRepo::enabled_prayers(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_no_answer_stays_undecided() {
        let conn = open_memory();
        let outcome = request_permission(&conn, true, &TODAY, || Ok(None)).unwrap();
        assert_eq!(outcome, PermissionOutcome::Dismissed);
        assert!(!outcome.should_schedule());
        assert_eq!(PrefsRepo::permission(&conn).unwrap(), Permission::Default);
        assert!(PrefsRepo::enabled_prayers(&conn).unwrap().is_empty());

        let outcome = request_permission(&conn, true, &TODAY, || Ok(Some(true))).unwrap();
        assert_eq!(outcome, PermissionOutcome::Granted);
    }
}
