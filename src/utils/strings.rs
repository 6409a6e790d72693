//! User-facing messages rendered in the page error list.

pub const CLOUDANT_PROBLEM: &str =
    "The review database is not configured. Set CLOUDANT_URL with CLOUDANT_USERNAME and CLOUDANT_PASSWORD or CLOUDANT_APIKEY.";
pub const NLU_PROBLEM: &str =
    "The sentiment service is not configured. Set NLU_APIKEY and NLU_URL.";
pub const INVALID_FORM: &str =
    "Please fill in your first name, last name, the movie title and your review.";
pub const NLU_NOT_ENOUGH_TEXT: &str =
    "The review text is too short to analyze. Please write a few more words.";
pub const CLOUDANT_ERROR: &str = "Database error:";
