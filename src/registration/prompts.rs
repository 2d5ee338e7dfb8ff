//! User-facing reply text for the registration conversation.

pub const WELCOME: &str = "Welcome! We'll begin the registration process. \
    Do a /cancel at any time to exit the registration process. \
    Please give me your name. Only alphabets and spaces are allowed.";

pub const INVALID_NAME: &str =
    "Name given contains invalid characters or is too long. Please give a valid name.";

pub const ASK_TITLE: &str = "What is your title?";

pub const INVALID_TITLE: &str = "Title given is invalid. Please give a valid title. E.g. exec";

pub const ASK_DEPARTMENT: &str = "What is your department?";

pub const INVALID_DEPARTMENT: &str =
    "Department given is invalid. Please give a valid department. E.g. IT";

pub const FINALISING: &str = "Okay! Finalising registration.";

pub const REGISTERED: &str = "Successfully registered you into the database. \
    Please wait a few hours for approval.";

pub const GENERIC_ERROR: &str =
    "An exception was caught. Please contact the administrator for help.";

pub const CANCELLED: &str = "Stopping the registration process.";

pub const NO_SESSION_TO_CANCEL: &str = "No registration is in progress.";

pub const HELP: &str = "This bot updates your attendance.\n\
    /register: starts the registration process\n\
    /update <status>: sets your status for the day\n\
    /pull: displays the attendance of all members in your department\n\
    /role <role> <user>: sets the role of the target user\n\
    /help: prints this message";

/// Greeting for a user whose profile is already approved.
pub fn already_registered(name: &str) -> String {
    format!("Hello {name}. You have already been registered into the database.")
}

/// Greeting for a user whose profile is still awaiting approval.
pub fn pending_approval(name: &str) -> String {
    format!("Hello {name}. Your account is pending approval. Please check back in a few hours.")
}

/// Notification sent to the department in-charge.
pub fn notify_in_charge(title: &str, name: &str) -> String {
    format!("{title} {name} is requesting to join your team.")
}

/// Notification sent to an administrator when a department has no in-charge.
pub fn notify_admin(title: &str, name: &str, department: &str) -> String {
    format!("{title} {name} is requesting to join the {department} department.")
}
