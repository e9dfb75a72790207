use uuid::Uuid;

/// The authenticated principal a request acts as. Built by the HTTP layer
/// from verified token claims and passed into every guarded operation.
#[derive(Clone, Debug)]
pub struct Actor {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == models::user::ROLE_ADMIN
    }
}
