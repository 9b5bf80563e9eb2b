use {
    chrono::{DateTime, TimeZone, Utc},
    goog4_signed_url::{
        sign_at, verify_signed_url, FixedClock, SignRequest, SigningError, SigningIdentity, UrlSigner,
    },
    http::{
        header::{HeaderMap, HeaderName, HeaderValue},
        method::Method,
    },
    std::sync::Arc,
};

const SERVICE_ACCOUNT_JSON: &str = include_str!("data/service-account.json");
const CREDENTIAL: &str =
    "signer%40example-project.iam.gserviceaccount.com%2F20240115%2Fauto%2Fstorage%2Fgoog4_request";

// Signatures below were produced independently with an RSASSA-PKCS1-v1_5/SHA-256 implementation over the
// same string to sign. PKCS#1 v1.5 signatures are deterministic.
const DOWNLOAD_SIGNATURE: &str = "\
93512b62f4d00a339f526e17018afb5349a4783720159d3bcd8e372a5902e309\
17c6be40615544dff84e6c2e89688f373e118275493d6d3d400f53f0be98474a\
f94fbf2de6ddb6556284e9942c1fa6d95f93bcafb0dd426ba970cdeeef0b8397\
1184229c5ba0f592c399c285013f7ff6f662384d958141d018517ad121189a10\
cde7424a8e1e84cee23e7315711b5143013b798bfd19eec95b82905f632acc13\
64af1ad979b90e0b2d58f3fe2c1adfa1efbf45ab1ba21be8a85cb81686d64264\
70c08c8ee2f751114f627f3ddafa56e4bf4846c188516d4b88ee741d57cc355b\
195b32932ff9c0a6fadcae250b758a62e965dffe575bf4dbc1f5ee523f5c5dc8";
const UPLOAD_SIGNATURE: &str = "\
62a54274905000e686d57a587cc5ef2a7453bf1be21d8c71fe1859ab995f1d3b\
17f2b2630f67ce3a8f9ac0fa828b557e12e473c2edf7874ef1969fe30ad59073\
b197e1f0579f6c6dfdbef7b281852515cc14cd9c052e78ebf062c4209b5168c3\
7f0ea3b5075c14587b3e85fa07f567097402d001dc5dd301971e6564a89e8e43\
a88c917cf39b67ee1a537e6bcd300714040f5aacb8e147713c323b6ff929ddae\
1fd44777a64f269c224f78b3209b94e96c8ede94a661c53f5ae405005c46a700\
bd1dbeca97fe22fbd591e67aec8a22af3ec6d993923385a99f077a18177ef39a\
0f3a9c2aecf39cc7d101594463d3ce90b9f98bce87da6d170ca643fcd78ca02e";
const CUSTOM_SIGNATURE: &str = "\
054edd42a363fed554f114e7c495010204b0c9da9ac20271ebfe7b7c85bdf964\
2f5b0bc9ac5f2157e8119643c99e30c95d989f9e781f45d66544707da5733058\
8721b29181e078cbaf9c39d428f6f08fcd0618e2338d3c16e17321814632d3d5\
fc7df4216072c3cc2b6eef2526146fc105dd8e6dc88bb1f9a7742977fa78acdd\
8998983970ceb214450a1edf60c4169f1689ded24812d8f64c80930c948ba97c\
f56d984db03856b75b565a5b5d744e8a85e572a5c9fa388285f211596ea11d1e\
ecfd3df6e7064989ed40606efaf619165184c0a09102124f6c33198defd815d0\
76e18b4160319fe8e2dbab04a6ecd6f31c785e82c8641477174482ef490a226a";

fn jan_15() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
}

fn identity() -> SigningIdentity {
    SigningIdentity::from_service_account_json(SERVICE_ACCOUNT_JSON).unwrap()
}

#[test_log::test]
fn download_url_matches_reference() {
    let signer = UrlSigner::with_clock(Arc::new(identity()), FixedClock(jan_15()));
    let url = signer.download_url("example-bucket", "reports/jan.csv").unwrap();

    let expected = format!(
        "https://example-bucket.storage.googleapis.com/reports/jan.csv?X-Goog-Algorithm=GOOG4-RSA-SHA256\
         &X-Goog-Credential={}&X-Goog-Date=20240115T000000Z&X-Goog-Expires=900\
         &X-Goog-SignedHeaders=host%3Bx-goog-acl&x-goog-signature={}",
        CREDENTIAL, DOWNLOAD_SIGNATURE
    );
    assert_eq!(url, expected);
}

#[test_log::test]
fn upload_url_matches_reference() {
    let signer = UrlSigner::with_clock(Arc::new(identity()), FixedClock(jan_15()));
    let url = signer.upload_url("example-bucket", "incoming/data 01.bin").unwrap();

    let expected = format!(
        "https://example-bucket.storage.googleapis.com/incoming/data%2001.bin?X-Goog-Algorithm=GOOG4-RSA-SHA256\
         &X-Goog-Credential={}&X-Goog-Date=20240115T000000Z&X-Goog-Expires=300\
         &X-Goog-SignedHeaders=host%3Bx-goog-acl&x-goog-signature={}",
        CREDENTIAL, UPLOAD_SIGNATURE
    );
    assert_eq!(url, expected);

    // The uploader has to send the ACL header the URL was signed with.
    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static("x-goog-acl"), HeaderValue::from_static("private"));
    let verified =
        verify_signed_url(&identity().public_key(), &Method::PUT, &url, &headers, jan_15()).unwrap();
    assert_eq!(verified.client_email(), "signer@example-project.iam.gserviceaccount.com");
    assert_eq!(verified.expiration(), 300);
}

#[test_log::test]
fn custom_request_matches_reference() {
    let request = SignRequest::builder()
        .bucket("example-bucket")
        .object("reports/jan ~ feb.csv")
        .expiration(3600)
        .header(HeaderName::from_static("x-goog-meta-owner"), HeaderValue::from_static("Finance "))
        .query_parameter("response-content-disposition", "attachment; filename=jan.csv")
        .build()
        .unwrap();
    let url = sign_at(&identity(), &request, jan_15()).unwrap();

    let expected = format!(
        "https://example-bucket.storage.googleapis.com/reports/jan%20~%20feb.csv?X-Goog-Algorithm=GOOG4-RSA-SHA256\
         &X-Goog-Credential={}&X-Goog-Date=20240115T000000Z&X-Goog-Expires=3600\
         &X-Goog-SignedHeaders=host%3Bx-goog-meta-owner\
         &response-content-disposition=attachment%3B%20filename%3Djan.csv&x-goog-signature={}",
        CREDENTIAL, CUSTOM_SIGNATURE
    );
    assert_eq!(url, expected);
}

#[test_log::test]
fn seven_day_limit() {
    let request = SignRequest::builder()
        .bucket("example-bucket")
        .object("reports/jan.csv")
        .expiration(604801)
        .build()
        .unwrap();

    match sign_at(&identity(), &request, jan_15()) {
        Err(SigningError::InvalidExpiration(604801)) => (),
        other => panic!("Expected InvalidExpiration(604801); got {:?}", other),
    }
}
