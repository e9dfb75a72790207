pub mod email;
pub mod env;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn envelope_ok_carries_data() {
        let r = types::ApiResponse::ok(5);
        assert!(r.success);
        assert_eq!(r.data, Some(5));
        assert!(r.message.is_none());
    }
}
