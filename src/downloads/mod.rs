/**
 * Downloads Module
 *
 * HTTP fetching for the runtime archive: manual redirect following and
 * streaming the body to disk with progress reporting.
 */

mod downloader;

pub use downloader::*;
