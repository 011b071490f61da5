use serde::{Deserialize, Serialize};

/// The signed-in user as carried by the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

/// Anything that belongs to exactly one user and may only be changed by them.
pub trait Owned {
    fn owner_id(&self) -> i64;
}

/// Ownership check shared by every edit/delete path.
/// Anonymous viewers never own anything.
pub fn is_owner<R: Owned + ?Sized>(resource: &R, viewer: Option<&Identity>) -> bool {
    viewer.is_some_and(|identity| identity.user_id == resource.owner_id())
}
