//! Client profile databag (`client_profile_databag_6_0`).

use armlink_domain::constants::{CLIENT_PROFILE_NAMESPACE, CLIENT_PROFILE_SCHEMA};
use armlink_domain::{Record, Result};

use super::field_map::{tns, FieldMap, FieldRule};
use super::xml::{to_document, XmlElement};
use super::submission_root;

/// Element order follows the schema.
pub fn field_map() -> Result<FieldMap> {
    FieldMap::new([
        FieldRule::text("Client_ID_Num", "Client_ID_Num__c"),
        FieldRule::text("Client_Case_Num", "Client_Case_Num__c"),
        FieldRule::text("Client_City", "Client_City__c"),
        FieldRule::text("Client_State", "Client_State__c"),
        FieldRule::text("Client_Zip", "Client_Zip__c"),
        FieldRule::text("Client_New_City", "Client_New_City__c"),
        FieldRule::text("Client_New_State", "Client_New_State__c"),
        FieldRule::text("Client_New_Zip", "Client_New_Zip__c"),
        FieldRule::text("Client_Family_Size", "Client_Family_Size__c"),
        FieldRule::text("Client_Gender", "Client_Gender__c"),
        FieldRule::text("Client_Marital_Status", "Client_Marital_Status__c"),
        FieldRule::text("Client_Race_ID", "Client_Race_ID__c"),
        FieldRule::text("Client_Ethnicity_ID", "Client_Ethnicity_ID__c"),
        FieldRule::text(
            "Client_Household_Gross_Monthly_Income",
            "Client_Household_Gross_Monthly_Income__c",
        ),
        FieldRule::text("Client_Head_Of_Household_Type", "Client_Head_Of_Household_Type__c"),
        FieldRule::text("Client_Counselor_ID", "Client_Counselor_ID__c"),
        FieldRule::text("Client_Counselor_HUD_Id", "Client_Counselor_HUD_Id__c"),
        FieldRule::text("Client_Highest_Educ_Grade", "Client_Highest_Educ_Grade__c"),
        FieldRule::text("Client_Farm_Worker", "Client_Farm_Worker__c"),
        FieldRule::text("Client_Rural_Area", "Client_Rural_Area__c"),
        FieldRule::text(
            "Client_Limited_English_Proficiency",
            "Client_Limited_English_Proficiency__c",
        ),
        FieldRule::text("Client_Colonias_Resident", "Client_Colonias_Resident__c"),
        FieldRule::text("Client_HUD_Assistance", "Client_HUD_Assistance__c"),
        FieldRule::text("Client_Disabled", "Client_Disabled__c"),
        FieldRule::text("Client_Dependents_Num", "Client_Dependents_Num__c").keep_zero(),
        FieldRule::date("Client_Intake_DT", "Client_Intake_DT__c"),
        FieldRule::datetime(
            "Client_Counsel_Start_Session_DateTime",
            "Client_Counsel_Start_Session_DateTime__c",
        ),
        FieldRule::datetime(
            "Client_Counsel_End_Session_DateTime",
            "Client_Counsel_End_Session_DateTime__c",
        ),
        FieldRule::text("Client_Language_Spoken", "Client_Language_Spoken__c"),
        FieldRule::text("Client_Session_Duration", "Client_Session_Duration__c").keep_zero(),
        FieldRule::text("Client_Counseling_Type", "Client_Counseling_Type__c"),
        FieldRule::text("Client_Counseling_Termination", "Client_Counseling_Termination__c"),
        FieldRule::text("Client_Counseling_Fee", "Client_Counseling_Fee__c").keep_zero(),
        FieldRule::text("Client_Attribute_HUD_Grant", "Client_Attribute_HUD_Grant__c"),
        FieldRule::text("Client_Grant_Amount_Used", "Client_Grant_Amount_Used__c"),
        FieldRule::text("Client_HECM_Certificate", "Client_HECM_Certificate__c"),
        FieldRule::date("Client_HECM_Certificate_Issue_Date", "Client_HECM_Certificate_Issue_Date__c"),
        FieldRule::date(
            "Client_HECM_Certificate_Expiration_Date",
            "Client_HECM_Certificate_Expiration_Date__c",
        ),
        FieldRule::text("Client_HECM_Certificate_ID", "Client_HECM_Certificate_ID__c"),
        FieldRule::text("Client_Predatory_Lending", "Client_Predatory_Lending__c"),
        FieldRule::text("Client_Mortgage_Type", "Client_Mortgage_Type__c"),
        FieldRule::text("Client_Mortgage_Type_After", "Client_Mortgage_Type_After__c"),
        FieldRule::text("Client_Finance_Type_Before", "Client_Finance_Type_Before__c"),
        FieldRule::text("Client_Finance_Type_After", "Client_Finance_Type_After__c"),
        FieldRule::text("Client_FirstTime_Home_Buyer", "Client_FirstTime_Home_Buyer__c"),
        FieldRule::text("Client_Discrimination_Victim", "Client_Discrimination_Victim__c")
            .or_default("N"),
        FieldRule::text("Client_Mortgage_Closing_Cost", "Client_Mortgage_Closing_Cost__c"),
        FieldRule::text("Client_Mortgage_Interest_Rate", "Client_Mortgage_Interest_Rate__c"),
        FieldRule::text("Client_Referred_By", "Client_Referred_By__c"),
        FieldRule::date("Client_Sales_Contract_Signed", "Client_Sales_Contract_Signed__c"),
        FieldRule::text("Client_Credit_Score", "Client_Credit_Score__c"),
        FieldRule::text("Client_No_Credit_Score_Reason", "Client_No_Credit_Score_Reason__c"),
        FieldRule::text("Client_Credit_Score_Source", "Client_Credit_Score_Source__c"),
        FieldRule::text("Client_Job_Duration", "Client_Job_Duration__c").keep_zero(),
        FieldRule::text("Client_Household_Debt", "Client_Household_Debt__c").keep_zero(),
        FieldRule::text("Client_Mortgage_Deliquency", "Client_Mortgage_Deliquency__c"),
        FieldRule::text("Client_Loan_Being_Reported", "Client_Loan_Being_Reported__c"),
        FieldRule::text("Client_Second_Loan_Exists", "Client_Second_Loan_Exists__c"),
        FieldRule::text("Client_Intake_Loan_Type", "Client_Intake_Loan_Type__c"),
        FieldRule::text(
            "Client_Intake_Loan_Type_Is_Hybrid_ARM",
            "Client_Intake_Loan_Type_Is_Hybrid_ARM__c",
        ),
        FieldRule::text(
            "Client_Intake_Loan_Type_Is_Option_ARM",
            "Client_Intake_Loan_Type_Is_Option_ARM__c",
        ),
        FieldRule::text(
            "Client_Intake_Loan_Type_Is_Interest_Only",
            "Client_Intake_Loan_Type_Is_Interest_Only__c",
        ),
        FieldRule::text(
            "Client_Intake_Loan_Type_Is_FHA_Or_VA_Insured",
            "Client_Intake_Loan_Type_Is_FHA_Or_VA_Ins__c",
        ),
        FieldRule::text("Client_Intake_Loan_Type_Is_Privately_Held", "Loan_Type_Is_Privately_Held__c"),
        FieldRule::text(
            "Client_Intake_Loan_Type_Has_Interest_Rate_Reset",
            "Loan_Type_Has_Interest_Rate_Reset__c",
        ),
        FieldRule::text("Client_Income_Level", "Client_Income_Level__c"),
        FieldRule::text("Client_Purpose_Of_Visit", "Client_Purpose_Of_Visit__c"),
        FieldRule::text("Client_Activity_Type", "Client_Activity_Type__c"),
        FieldRule::text("Client_9902_Reporting_Qtr", "X9902ReportingQuarter__c"),
        FieldRule::multi("Client_Outcomes", "Client_Outcome", "Client_Outcome__c"),
    ])
}

/// Builds the element tree: one `Client_Profile` per record.
pub fn build(records: &[Record]) -> Result<XmlElement> {
    let map = field_map()?;
    let mut profiles = XmlElement::new(tns("Client_Profiles"));
    for record in records {
        let mut profile = XmlElement::new(tns("Client_Profile"));
        map.apply_into(record, &mut profile)?;
        profiles.push(profile);
    }
    Ok(submission_root(CLIENT_PROFILE_NAMESPACE, CLIENT_PROFILE_SCHEMA).child(profiles))
}

/// Client profile document as XML text.
pub fn render(records: &[Record]) -> Result<String> {
    to_document(&build(records)?)
}

#[cfg(test)]
mod tests {
    use armlink_domain::FieldValue;

    use super::super::xml::tests::assert_well_formed;
    use super::*;

    fn profile_of(record: Record) -> XmlElement {
        let root = build(&[record]).unwrap();
        root.find("tns:Client_Profiles").unwrap().find("tns:Client_Profile").unwrap().clone()
    }

    #[test]
    fn field_map_tags_are_unique() {
        assert_eq!(field_map().unwrap().rules().len(), 70);
    }

    #[test]
    fn zero_counts_are_emitted_and_falsy_text_omitted() {
        let profile = profile_of(
            Record::new()
                .with("Client_Dependents_Num__c", 0_i64)
                .with("Client_Household_Debt__c", 0_i64)
                .with("Client_Family_Size__c", 0_i64)
                .with("Client_City__c", "")
                .with("Client_State__c", FieldValue::Null),
        );

        assert_eq!(profile.find("tns:Client_Dependents_Num").unwrap().text.as_deref(), Some("0"));
        assert_eq!(profile.find("tns:Client_Household_Debt").unwrap().text.as_deref(), Some("0"));
        assert!(profile.find("tns:Client_Family_Size").is_none());
        assert!(profile.find("tns:Client_City").is_none());
        assert!(profile.find("tns:Client_State").is_none());
        assert!(profile.find("tns:Client_Session_Duration").is_none());
    }

    #[test]
    fn discrimination_victim_defaults_to_no() {
        let profile = profile_of(Record::new());
        assert_eq!(
            profile.find("tns:Client_Discrimination_Victim").unwrap().text.as_deref(),
            Some("N")
        );
    }

    #[test]
    fn renamed_source_fields_land_on_schema_tags() {
        let profile = profile_of(
            Record::new()
                .with("Client_Intake_Loan_Type_Is_FHA_Or_VA_Ins__c", "Y")
                .with("Loan_Type_Is_Privately_Held__c", "N")
                .with("X9902ReportingQuarter__c", "2")
                .with("Client_Intake_DT__c", "2023-03-05")
                .with("Client_Counsel_Start_Session_DateTime__c", "2023-03-05")
                .with("Client_Outcome__c", "1;4"),
        );

        let text = |tag: &str| profile.find(tag).and_then(|e| e.text.clone());
        assert_eq!(text("tns:Client_Intake_Loan_Type_Is_FHA_Or_VA_Insured").as_deref(), Some("Y"));
        assert_eq!(text("tns:Client_Intake_Loan_Type_Is_Privately_Held").as_deref(), Some("N"));
        assert_eq!(text("tns:Client_9902_Reporting_Qtr").as_deref(), Some("2"));
        assert_eq!(text("tns:Client_Intake_DT").as_deref(), Some("03-05-2023"));
        assert_eq!(
            text("tns:Client_Counsel_Start_Session_DateTime").as_deref(),
            Some("03-05-2023 12:00")
        );
        assert_eq!(profile.find("tns:Client_Outcomes").unwrap().children.len(), 2);
        // outcomes close the profile
        assert_eq!(profile.children.last().unwrap().name, "tns:Client_Outcomes");
    }

    #[test]
    fn zero_records_still_render_a_document() {
        let xml = render(&[]).unwrap();
        assert!(xml.contains(r#"xmlns:tns="http://gov.hud.arm/client_profile_databag_6_0""#));
        assert!(xml.contains(
            r#"xsi:schemaLocation="http://gov.hud.arm/client_profile_databag_6_0 client_profile_databag_6_0.xsd""#
        ));
        assert!(xml.contains("<tns:Client_Profiles/>"));
        assert_well_formed(&xml);
    }
}
