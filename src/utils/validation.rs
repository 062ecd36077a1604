use validator::Validate;

use crate::errors::AppError;
use crate::utils::naming::split_filename;

pub const PERMITTED_EXTENSIONS: [&str; 7] = ["doc", "pdf", "docx", "zip", "jpeg", "jpg", "png"];
pub const MAX_FILE_SIZE: usize = 2 * 1024 * 1024;

pub fn validate_extension(filename: &str) -> bool {
    let (_, ext) = split_filename(filename);
    PERMITTED_EXTENSIONS.contains(&ext.trim_start_matches('.'))
}

pub fn validate_size(size: usize) -> bool {
    size <= MAX_FILE_SIZE
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|err| AppError::Validation(err.to_string()))
}
