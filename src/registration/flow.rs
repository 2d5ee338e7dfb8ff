//! The registration conversation flow.
//!
//! One inbound message per turn: validate the submitted field, store it in
//! the per-user session, advance or re-prompt. The department step is the
//! only path that writes to the store, and the write happens only after all
//! three fields validated.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::Error;
use crate::notify::{NotificationRouter, Notifier};
use crate::registration::prompts;
use crate::registration::session::{RegistrationSession, SessionStore};
use crate::registration::state::RegistrationState;
use crate::registration::validate;
use crate::store::{UserProfile, UserStore};

/// The registration state machine with its injected collaborators.
pub struct Registrar {
    store: Arc<dyn UserStore>,
    router: NotificationRouter,
    sessions: Arc<SessionStore>,
}

impl Registrar {
    pub fn new(
        store: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        let router = NotificationRouter::new(Arc::clone(&store), notifier);
        Self {
            store,
            router,
            sessions,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Process one message from a user and return the replies to send.
    ///
    /// The user's session slot stays locked for the whole transition, so a
    /// second message from the same user waits its turn. Any internal fault
    /// collapses to a single generic terminal reply and drops the session.
    pub async fn handle(&self, user_id: i64, text: &str) -> Vec<String> {
        let text = text.trim();
        let slot = self.sessions.slot(user_id);
        let mut guard = slot.lock().await;

        match self.advance(user_id, text, &mut guard).await {
            Ok(replies) => replies,
            Err(e) => {
                error!(user_id, error = %e, "Registration turn failed");
                *guard = None;
                vec![prompts::GENERIC_ERROR.to_string()]
            }
        }
    }

    async fn advance(
        &self,
        user_id: i64,
        text: &str,
        session: &mut Option<RegistrationSession>,
    ) -> Result<Vec<String>, Error> {
        if text == "/cancel" {
            return Ok(self.cancel(user_id, session));
        }
        if text == "/register" && session.is_none() {
            return self.start(user_id, session).await;
        }

        let Some(current) = session.as_mut() else {
            // No conversation in progress; stray text is not an error.
            tracing::debug!(user_id, "Ignoring message outside a registration session");
            return Ok(Vec::new());
        };

        // In-session slash commands other than /cancel are unrecognized
        // input: generic terminal reply, session discarded.
        if text.starts_with('/') {
            warn!(user_id, text, "Unrecognized command during registration");
            *session = None;
            return Ok(vec![prompts::GENERIC_ERROR.to_string()]);
        }

        current.touch();
        match current.state {
            RegistrationState::Name => Ok(Self::take_name(user_id, current, text)),
            RegistrationState::Title => Ok(Self::take_title(user_id, current, text)),
            RegistrationState::Department => {
                if !validate::valid_department(text) {
                    info!(user_id, "Invalid department submitted, re-prompting");
                    return Ok(vec![prompts::INVALID_DEPARTMENT.to_string()]);
                }

                info!(user_id, department = text, "Saving department");
                current.department = Some(text.to_string());
                current.state = RegistrationState::Done;
                let name = current.name.clone().unwrap_or_default();
                let title = current.title.clone().unwrap_or_default();
                *session = None;

                Ok(self.finish_and_notify(user_id, &name, &title, text).await)
            }
            state => {
                // Terminal states never stay in the session store.
                warn!(user_id, %state, "Session in terminal state, discarding");
                *session = None;
                Ok(vec![prompts::GENERIC_ERROR.to_string()])
            }
        }
    }

    /// Entry guard: `/register` is a no-op for anyone already in the store.
    async fn start(
        &self,
        user_id: i64,
        session: &mut Option<RegistrationSession>,
    ) -> Result<Vec<String>, Error> {
        info!(user_id, "Starting user registration");

        if let Some(profile) = self.store.find_user(user_id).await? {
            info!(user_id, "User already exists in the store");
            let reply = if profile.approved {
                prompts::already_registered(&profile.name)
            } else {
                prompts::pending_approval(&profile.name)
            };
            return Ok(vec![reply]);
        }

        *session = Some(RegistrationSession::new());
        Ok(vec![prompts::WELCOME.to_string()])
    }

    fn cancel(&self, user_id: i64, session: &mut Option<RegistrationSession>) -> Vec<String> {
        if session.take().is_some() {
            info!(user_id, "Cancelling registration");
            vec![prompts::CANCELLED.to_string()]
        } else {
            vec![prompts::NO_SESSION_TO_CANCEL.to_string()]
        }
    }

    fn take_name(user_id: i64, session: &mut RegistrationSession, text: &str) -> Vec<String> {
        if !validate::valid_name(text) {
            info!(user_id, "Invalid name submitted, re-prompting");
            return vec![prompts::INVALID_NAME.to_string()];
        }

        info!(user_id, name = text, "Saving name");
        session.name = Some(text.to_string());
        session.state = RegistrationState::Title;
        vec![prompts::ASK_TITLE.to_string()]
    }

    fn take_title(user_id: i64, session: &mut RegistrationSession, text: &str) -> Vec<String> {
        let title = text.to_uppercase();
        if !validate::valid_title(&title) {
            info!(user_id, "Invalid title submitted, re-prompting");
            return vec![prompts::INVALID_TITLE.to_string()];
        }

        info!(user_id, title, "Saving title");
        session.title = Some(title);
        session.state = RegistrationState::Department;
        vec![prompts::ASK_DEPARTMENT.to_string()]
    }

    /// Final step: persist the profile and notify an approver. The
    /// notification attempt is not gated on the insert outcome; the two
    /// operations are independent and there is no transaction across them.
    async fn finish_and_notify(
        &self,
        user_id: i64,
        name: &str,
        title: &str,
        department: &str,
    ) -> Vec<String> {
        let mut replies = vec![prompts::FINALISING.to_string()];

        let profile = UserProfile::pending(user_id, name, title, department);
        match self.store.insert_user(&profile).await {
            Ok(()) => {
                info!(user_id, "Finished registration");
                replies.push(prompts::REGISTERED.to_string());
            }
            Err(e) => {
                error!(user_id, error = %e, "Failed to persist registration");
                replies.push(prompts::GENERIC_ERROR.to_string());
            }
        }

        match self.router.notify(name, title, department).await {
            Ok(true) => {}
            Ok(false) => info!(user_id, "Failed to find someone to notify"),
            Err(e) => error!(user_id, error = %e, "Notification failed"),
        }

        replies
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::ChannelError;
    use crate::store::{LibSqlStore, Role};

    struct RecordingNotifier {
        sent: Mutex<Vec<(i64, String)>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_direct(&self, user_id: i64, text: &str) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push((user_id, text.to_string()));
            Ok(())
        }
    }

    async fn registrar() -> (Registrar, Arc<LibSqlStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(LibSqlStore::open_in_memory().await.unwrap());
        let notifier = Arc::new(RecordingNotifier::new());
        let registrar = Registrar::new(
            store.clone(),
            notifier.clone(),
            Arc::new(SessionStore::new()),
        );
        (registrar, store, notifier)
    }

    async fn seed_ic(store: &LibSqlStore, user_id: i64, department: &str) {
        store
            .insert_user(&UserProfile {
                user_id,
                name: "In Charge".into(),
                title: "MGR".into(),
                department: department.into(),
                role: Role::Ic,
                approved: true,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn happy_path_registers_and_notifies_in_charge() {
        let (registrar, store, notifier) = registrar().await;
        seed_ic(&store, 7, "IT").await;

        assert_eq!(registrar.handle(42, "/register").await, vec![prompts::WELCOME]);
        assert_eq!(registrar.handle(42, "Jane Doe").await, vec![prompts::ASK_TITLE]);
        assert_eq!(registrar.handle(42, "exec").await, vec![prompts::ASK_DEPARTMENT]);
        assert_eq!(
            registrar.handle(42, "IT").await,
            vec![prompts::FINALISING.to_string(), prompts::REGISTERED.to_string()]
        );

        let profile = store.find_user(42).await.unwrap().unwrap();
        assert_eq!(profile.name, "Jane Doe");
        assert_eq!(profile.title, "EXEC");
        assert_eq!(profile.department, "IT");
        assert_eq!(profile.role, Role::User);
        assert!(!profile.approved);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            &[(7, "EXEC Jane Doe is requesting to join your team.".to_string())]
        );

        // Session is gone after the terminal reply.
        assert!(registrar.sessions().slot(42).lock().await.is_none());
    }

    #[tokio::test]
    async fn register_is_idempotent_for_existing_users() {
        let (registrar, store, _) = registrar().await;
        registrar.handle(42, "/register").await;
        registrar.handle(42, "Jane Doe").await;
        registrar.handle(42, "exec").await;
        registrar.handle(42, "IT").await;

        // Pending user pinging again: status reply, no session, no new row.
        let replies = registrar.handle(42, "/register").await;
        assert_eq!(replies, vec![prompts::pending_approval("Jane Doe")]);
        assert!(registrar.sessions().slot(42).lock().await.is_none());

        store.set_approval(42, true).await.unwrap();
        let replies = registrar.handle(42, "/register").await;
        assert_eq!(replies, vec![prompts::already_registered("Jane Doe")]);
    }

    #[tokio::test]
    async fn invalid_input_re_prompts_without_advancing() {
        let (registrar, store, _) = registrar().await;
        registrar.handle(42, "/register").await;

        assert_eq!(registrar.handle(42, "Jane 42").await, vec![prompts::INVALID_NAME]);
        assert_eq!(registrar.handle(42, "Jane Doe").await, vec![prompts::ASK_TITLE]);

        assert_eq!(registrar.handle(42, "e").await, vec![prompts::INVALID_TITLE]);
        assert_eq!(registrar.handle(42, "exec").await, vec![prompts::ASK_DEPARTMENT]);

        // Single-letter department is rejected, state stays, nothing inserted.
        assert_eq!(registrar.handle(42, "I").await, vec![prompts::INVALID_DEPARTMENT]);
        assert!(store.find_user(42).await.unwrap().is_none());

        let slot = registrar.sessions().slot(42);
        let guard = slot.lock().await;
        let session = guard.as_ref().unwrap();
        assert_eq!(session.state, RegistrationState::Department);
        assert_eq!(session.name.as_deref(), Some("Jane Doe"));
        assert_eq!(session.title.as_deref(), Some("EXEC"));
        assert!(session.department.is_none());
    }

    #[tokio::test]
    async fn cancel_aborts_the_conversation() {
        let (registrar, store, _) = registrar().await;
        registrar.handle(42, "/register").await;
        registrar.handle(42, "Jane Doe").await;

        assert_eq!(registrar.handle(42, "/cancel").await, vec![prompts::CANCELLED]);
        assert!(registrar.sessions().slot(42).lock().await.is_none());
        assert!(store.find_user(42).await.unwrap().is_none());

        // Nothing in progress anymore.
        assert_eq!(
            registrar.handle(42, "/cancel").await,
            vec![prompts::NO_SESSION_TO_CANCEL]
        );
    }

    #[tokio::test]
    async fn unknown_command_in_session_is_a_terminal_error() {
        let (registrar, _, _) = registrar().await;
        registrar.handle(42, "/register").await;

        assert_eq!(registrar.handle(42, "/pull").await, vec![prompts::GENERIC_ERROR]);
        assert!(registrar.sessions().slot(42).lock().await.is_none());
    }

    #[tokio::test]
    async fn stray_text_without_session_is_ignored() {
        let (registrar, _, _) = registrar().await;
        assert!(registrar.handle(42, "hello there").await.is_empty());
    }

    #[tokio::test]
    async fn notification_falls_back_to_admin() {
        let (registrar, store, notifier) = registrar().await;
        store
            .insert_user(&UserProfile {
                user_id: 5,
                name: "Admin".into(),
                title: "BOSS".into(),
                department: "OPS".into(),
                role: Role::Admin,
                approved: true,
            })
            .await
            .unwrap();

        registrar.handle(42, "/register").await;
        registrar.handle(42, "Jane Doe").await;
        registrar.handle(42, "exec").await;
        registrar.handle(42, "IT").await;

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            &[(5, "EXEC Jane Doe is requesting to join the IT department.".to_string())]
        );
    }

    #[tokio::test]
    async fn no_recipient_still_reports_success_to_the_user() {
        let (registrar, store, notifier) = registrar().await;

        registrar.handle(42, "/register").await;
        registrar.handle(42, "Jane Doe").await;
        registrar.handle(42, "exec").await;
        let replies = registrar.handle(42, "IT").await;

        assert_eq!(
            replies,
            vec![prompts::FINALISING.to_string(), prompts::REGISTERED.to_string()]
        );
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert!(store.find_user(42).await.unwrap().is_some());
    }
}
