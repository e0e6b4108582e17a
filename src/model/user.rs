use sqlx::FromRow;

#[derive(FromRow)]
pub struct UserRow {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub role_id: u8,
    /// Present only if this account is linked to an employee record.
    pub employee_id: Option<u64>,
}
