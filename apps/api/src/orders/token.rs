use rand::{distributions::Alphanumeric, Rng};

const DOWNLOAD_TOKEN_LEN: usize = 32;
const RECEIPT_ID_LEN: usize = 24;

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// URL-safe redemption key, independent of any gateway identifier.
pub fn generate_download_token() -> String {
    random_alphanumeric(DOWNLOAD_TOKEN_LEN)
}

/// Local order id, also sent to the gateway as the order receipt.
pub fn generate_receipt_id() -> String {
    format!("order_{}", random_alphanumeric(RECEIPT_ID_LEN))
}
