//! Shared test helpers for `armlink-core` integration tests.
//!
//! In-memory fakes for the CRM and the reporting gateway so submission
//! tests can script responses and inspect every call made.

#![allow(dead_code)]

pub mod fakes;

use armlink_domain::Record;

pub const CASE_ID: &str = "a0B5e000001AbCdEAK";

pub fn settings_record() -> Record {
    Record::new()
        .with("Name", "HUD Settings")
        .with("EndpointURL__c", "https://arm.example.gov/ArmService")
        .with("AgencyId__c", "80123")
        .with("AgencyName__c", "Housing Partners")
        .with("Username__c", "agency")
        .with("Password__c", "secret")
        .with("CMSPassword__c", "cms-pass")
        .with("VendorId__c", "17")
}

pub fn submit_response(id: &str) -> String {
    format!(
        "<S:Envelope xmlns:S=\"http://schemas.xmlsoap.org/soap/envelope/\"><S:Body>\
         <ns2:postClientDataResponse xmlns:ns2=\"http://service.arm.hud.gov/\"><return>\
         <submissionId>{id}</submissionId></return></ns2:postClientDataResponse></S:Body></S:Envelope>"
    )
}

pub fn status_response(message: &str) -> String {
    format!(
        "<S:Envelope xmlns:S=\"http://schemas.xmlsoap.org/soap/envelope/\"><S:Body>\
         <ns2:getSubmissionInfoResponse xmlns:ns2=\"http://service.arm.hud.gov/\"><return>\
         <statusMessage>{message}</statusMessage></return></ns2:getSubmissionInfoResponse></S:Body></S:Envelope>"
    )
}
