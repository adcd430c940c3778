use crate::domain::model::BlobUrl;
use crate::utils::error::{QuantumError, Result};
use url::Url;

/// 拆解 `https://{account}.blob.core.windows.net/{container}/{blob}?{sas}`
pub fn parse_blob_url(blob_url: &str) -> Result<BlobUrl> {
    let url = Url::parse(blob_url).map_err(|e| {
        QuantumError::invalid_argument(format!("Blob URL is not valid ({}): {}", e, blob_url))
    })?;

    let host = url
        .host_str()
        .ok_or_else(|| QuantumError::invalid_argument(format!("Blob URL has no host: {}", blob_url)))?;
    let account_name = host.split('.').next().unwrap_or(host).to_string();

    let endpoint = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let (container, blob_segments) = match segments.split_first() {
        Some((container, rest)) if !rest.is_empty() => (container.to_string(), rest),
        _ => {
            return Err(QuantumError::invalid_argument(format!(
                "Blob URL must contain a container and a blob name: {}",
                blob_url
            )))
        }
    };

    Ok(BlobUrl {
        account_name,
        container,
        blob: blob_segments.join("/"),
        sas_token: url.query().unwrap_or_default().to_string(),
        endpoint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blob_url() {
        let sas = "sv=2018-03-28&sr=c&sig=some-sig&sp=racwl";
        let url = format!(
            "https://accountname.blob.core.windows.net/containername/rawOutputData?{}",
            sas
        );

        let blob = parse_blob_url(&url).unwrap();

        assert_eq!(blob.account_name, "accountname");
        assert_eq!(blob.container, "containername");
        assert_eq!(blob.blob, "rawOutputData");
        assert_eq!(blob.sas_token, sas);
        assert_eq!(blob.endpoint, "https://accountname.blob.core.windows.net");
        assert_eq!(blob.download_url(), url);
    }

    #[test]
    fn test_parse_blob_url_nested_blob_and_port() {
        let blob = parse_blob_url("http://127.0.0.1:10000/job-1/outputs/raw/data.json?sig=x").unwrap();

        assert_eq!(blob.account_name, "127");
        assert_eq!(blob.container, "job-1");
        assert_eq!(blob.blob, "outputs/raw/data.json");
        assert_eq!(blob.endpoint, "http://127.0.0.1:10000");
        assert_eq!(
            blob.download_url(),
            "http://127.0.0.1:10000/job-1/outputs/raw/data.json?sig=x"
        );
    }

    #[test]
    fn test_parse_blob_url_without_sas() {
        let blob = parse_blob_url("https://acct.blob.core.windows.net/c/b").unwrap();
        assert_eq!(blob.sas_token, "");
        assert_eq!(blob.download_url(), "https://acct.blob.core.windows.net/c/b");
    }

    #[test]
    fn test_parse_blob_url_rejects_missing_blob() {
        let err = parse_blob_url("https://acct.blob.core.windows.net/containeronly?sv=1").unwrap_err();
        assert!(matches!(err, QuantumError::InvalidArgumentValue { .. }));

        let err = parse_blob_url("not a url").unwrap_err();
        assert!(matches!(err, QuantumError::InvalidArgumentValue { .. }));
        assert!(err.to_string().contains("not a url"));
    }
}
