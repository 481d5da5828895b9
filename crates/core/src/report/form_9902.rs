//! Form 9902 databag (`form_9902_databag_6_0`).
//!
//! The document has three sections:
//! - `Form_9902`: aggregate counts. `Report_Period_Id` comes once from the
//!   first summary row; every other tag is emitted once per summary row,
//!   carrying that row's `activity_type_id` attribute when it has one.
//! - `Group_Sessions`: sessions keyed by `Group_Session_Id__c`, each with
//!   its attendees nested underneath by exact id match.
//! - `Attendees`: individual attendees.

use std::collections::HashMap;

use armlink_domain::constants::{FORM_9902_NAMESPACE, FORM_9902_SCHEMA};
use armlink_domain::{Record, Result};

use super::field_map::{tns, FieldMap, FieldRule};
use super::submission_root;
use super::xml::{to_document, XmlElement};

const REPORT_PERIOD_TAG: &str = "Report_Period_Id";
const REPORT_PERIOD_SOURCE: &str = "Report_Period_Id__c";
const ACTIVITY_TYPE_SOURCE: &str = "Activity_type_id__c";
const SESSION_KEY: &str = "Group_Session_Id__c";

/// Summary tag → source field, in schema order.
const SUMMARY_TAGS: &[(&str, &str)] = &[
    ("Ethnicity_Households_Counseling_Hispanic", "Hispanic__c"),
    ("Ethnicity_Households_Counseling_Non_Hispanic", "Non_Hispanic__c"),
    ("Ethnicity_Households_Counseling_No_Response", "No_Response__c"),
    ("Section_3_Total", "Section_3_Total__c"),
    ("Race_Households_Counseling_American_Indian", "American_Indian__c"),
    ("Race_Households_Counseling_Asian", "Asian__c"),
    ("Race_Households_Counseling_Black_African_American", "Black_African_American__c"),
    ("Race_Households_Counseling_Pacific_Islanders", "Pacific_Islanders__c"),
    ("Race_Households_Counseling_White", "White__c"),
    ("Race_Households_Counseling_More_Than_One_Race", "More_Than_one_Race__c"),
    ("Race_Households_Counseling_No_Response", "MultiRace_No_Response__c"),
    ("Section_4_Total", "Section_4_Total__c"),
    ("Less30_AMI_Level", "Less30_AMI_Level__c"),
    ("a30_49_AMI_Level", "A30_49_AMI_Level__c"),
    ("a50_79_AMI_Level", "A50_79_AMI_Level__c"),
    ("a80_100_AMI_Level", "A80_100_AMI_Level__c"),
    ("Greater100_AMI_Level", "Greater100_AMI_Level__c"),
    ("AMI_No_Response", "AMI_No_Response__c"),
    ("Section_5_Total", "Section_5_Total__c"),
    ("Lives_In_Rural_Area", "Household_Lives_In_Rural_Area__c"),
    ("Does_Not_Live_In_Rural_Area", "Household_Does_Not_Live_In_Rural_Area__c"),
    ("Rural_Area_No_Response", "Rural_Area_No_Response__c"),
    ("Section_6_Total", "Section_6_Total__c"),
    ("Limited_English_Proficient", "Is_Limited_English_Proficient__c"),
    ("Not_Limited_English_Proficient", "Not_Limited_English_Proficient__c"),
    ("Limited_English_Proficient_No_Response", "Limited_English_Proficient_No_Response__c"),
    ("Section_7_Total", "Section_7_Total__c"),
    ("Education_Compl_Fin_Lit_Workshop", "Fin_Lit_Workshop__c"),
    ("Education_Compl_Pred_Lend_Workshop", "Pred_Lend_Workshop__c"),
    ("Education_Compl_Fair_Housing_Workshop", "Fair_Housing_Workshop__c"),
    ("Education_Compl_Homeless_Prev_Workshop", "Homeless_Prev_Workshop__c"),
    ("Education_Compl_Rental_Workshop", "Rental_Workshop__c"),
    ("Education_Compl_PrePurchase_HomeBuyer_Workshop", "PrePurchase_HomeBuyer_Workshop__c"),
    ("Education_Compl_NonDelinqency_PostPurchase_Workshop", "NonDelinqency_PostPurchase_Workshop__c"),
    ("Education_Compl_Resolv_Prevent_Mortg_Delinq_Workshop", "Resolv_Prevent_Mortg_Delinq_Workshop__c"),
    ("Education_Compl_Disaster_Prepare_Workshop", "Completed_Disaster_Preparedness_Workshop__c"),
    ("Education_Compl_Disaster_Recovery_Workshop", "Disaster_Recover_Workshop__c"),
    ("Section_8_Total", "Section_8_Total__c"),
    ("One_Homeless_Assistance_Counseling", "Homeless_Assistance_Counseling__c"),
    ("One_Rental_Topics_Counseling", "Rental_Topics_Counseling__c"),
    ("One_PrePurchase_HomeBuying_Counseling", "PrePurchase_HomeBuying_Counseling__c"),
    ("One_Non_Delinq_Post_Purchase_Counseling", "Fin_Management_Counseling__c"),
    ("One_Reverse_Mortgage_Counseling", "Reverse_Mortgage_Counseling__c"),
    ("One_Resolv_Prevent_Fwd_Mortg_Delinq_Counseling", "Forward_Mortgage_Delinquency_or_Default__c"),
    ("One_Resolv_Prevent_Rev_Mortg_Delinq_Counseling", "Reverse_Mortgage_Delinquency_or_Default__c"),
    ("One_Disaster_Preparedness_Assistance_Counseling", "Disaster_Preparedness_Assistance__c"),
    ("One_Disaster_Recovery_Assistance_Counseling", "Disaster_Recovery_Assistance__c"),
    ("Section_9_Total", "Section_9_Total__c"),
    ("Outcome_One_On_One_And_Education", "One_On_One_And_Group__c"),
    ("Outcome_Received_Info_Fair_Housing", "Received_Info_Fair_Housing__c"),
    ("Outcome_Developed_Budget", "Developed_Sustainable_Budget__c"),
    ("Outcome_Improved_Financial_Capacity", "Improved_Financial_Capacity__c"),
    ("Outcome_Gained_Access_Resources_Improve_Housing", "Gained_Access_Resources_Improve_Housing__c"),
    ("Outcome_Gained_Access_NonHousing_Resources", "Gained_Access_NonHousing_Resources__c"),
    ("Outcome_Homeless_Obtained_Housing", "Homeless_Obtained_Housing__c"),
    (
        "Outcome_Gained_Access_Disaster_Recovery_NonHousing_Resources",
        "Disaster_Recovery_Non_housing_Resources__c",
    ),
    (
        "Outcome_Obtained_Disaster_Recovery_Housing_Resources",
        "Disaster_Recovery_Housing_Resources__c",
    ),
    ("Outcome_Developed_Emergency_Preparedness_Plan", "Emergency_Preparedness_Plan__c"),
    (
        "Outcome_Received_Rental_Counseling_Avoided_Eviction",
        "Rec_Rental_Counseling_Avoided_Eviction__c",
    ),
    (
        "Outcome_Received_Rental_Counseling_Improved_Living_Conditions",
        "Rec_Rental_Counseling_Living_Conditions__c",
    ),
    (
        "Outcome_Received_PrePurchase_Counseling_Purchased_Housing",
        "PrePurchase_Counseling_Purchased_Housing__c",
    ),
    (
        "Outcome_Received_Reverse_Mortgage_Counseling_Obtained_HECM",
        "Mortgage_Counseling_Obtained_HECM__c",
    ),
    (
        "Outcome_Received_NonDelinquency_PostPurchase_Counseling_Improve_Conditions_Affordability",
        "NonDel_PostPur_Coun_Imp_Cond_Afford__c",
    ),
    (
        "Outcome_Prevented_Resolved_Forward_Mortgage_Default",
        "Prevented_Forward_Mortgage_Default__c",
    ),
    (
        "Outcome_Prevented_Resolved_Reverse_Mortgage_Default",
        "Prevented_Reverse_Mortgage_Default__c",
    ),
    (
        "Outcome_Received_Forward_Mortgage_Modification_Remain_Current_In_Modified_Mortgage",
        "Forward_Mortgage_Mod_Improved_Financials__c",
    ),
    (
        "Outcome_Received_Forward_Mortgage_Modification_Improved_Financial_Capacity",
        "Forward_Mod_Improved_Financial_Capacity__c",
    ),
    ("Section_10_Total", "Section_10_Total__c"),
];

/// Records behind one Form 9902 submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form9902Records {
    pub summaries: Vec<Record>,
    pub group_sessions: Vec<Record>,
    pub group_session_attendees: Vec<Record>,
    pub attendees: Vec<Record>,
}

impl Form9902Records {
    pub fn total(&self) -> usize {
        self.summaries.len()
            + self.group_sessions.len()
            + self.group_session_attendees.len()
            + self.attendees.len()
    }
}

pub fn summary_map() -> Result<FieldMap> {
    FieldMap::new(SUMMARY_TAGS.iter().map(|&(tag, source)| FieldRule::text(tag, source).or_default("0")))
}

/// Source columns the summary query must select.
pub fn summary_source_fields() -> Vec<&'static str> {
    std::iter::once(REPORT_PERIOD_SOURCE)
        .chain(SUMMARY_TAGS.iter().map(|&(_, source)| source))
        .collect()
}

pub fn group_session_map() -> Result<FieldMap> {
    FieldMap::new([
        FieldRule::text("Group_Session_Id", "Group_Session_Id__c"),
        FieldRule::text("Group_Session_Counselor_Id", "Group_Session_Counselor_Id__c"),
        FieldRule::text("Group_Session_Counselor_HUD_Id", "Group_Session_Counselor_HUD_Id__c"),
        FieldRule::text("Group_Session_Title", "Group_Session_Title__c"),
        FieldRule::date("Group_Session_Date", "Group_Session_Date__c"),
        FieldRule::text("Group_Session_Duration", "Group_Session_Duration__c"),
        FieldRule::text("Group_Session_Type", "Group_Session_Type__c"),
        FieldRule::text("Group_Session_Attribute_HUD_Grant", "Group_Session_Attribute_HUD_Grant__c"),
        FieldRule::text("Group_Session_Activity_Type", "Group_Session_Activity_Type__c"),
    ])
}

pub fn group_session_attendee_map() -> Result<FieldMap> {
    FieldMap::new([
        FieldRule::text("Attendee_Id", "Group_Session_Attendee_Id__c"),
        FieldRule::text("Attendee_Fee_Amount", "Attendee_Fee_Amount__c").or_default("0"),
        FieldRule::text("Attendee_Referred_By", "Attendee_Referred_By__c"),
        FieldRule::text("Attendee_FirstTime_Home_Buyer", "Attendee_FirstTime_Home_Buyer__c"),
        FieldRule::text("Attendee_Income_Level", "Group_Session_Attendee_Income_Level__c"),
        FieldRule::text("Attendee_City", "Group_Session_Attendee_City__c"),
        FieldRule::text("Attendee_State", "Group_Session_Attendee_State__c"),
        FieldRule::text("Attendee_Zip_Code", "Group_Session_Attendee_Zip_Code__c"),
        FieldRule::text("Attendee_Rural_Area", "Group_Session_Attendee_Rural_Area_Status__c"),
        FieldRule::text(
            "Attendee_Limited_English_Proficiency",
            "Grp_Attendee_Limited_English_Proficiency__c",
        ),
    ])
}

pub fn attendee_map() -> Result<FieldMap> {
    FieldMap::new([
        FieldRule::text("Attendee_Id", "Attendee_ID__c"),
        FieldRule::text("Attendee_Income_Level", "Attendee_Income_Level__c"),
        FieldRule::text("Attendee_City", "Attendee_City__c"),
        FieldRule::text("Attendee_State", "Attendee_State__c"),
        FieldRule::text("Attendee_Zip_Code", "Attendee_Zip_Code__c"),
        FieldRule::text("Attendee_Rural_Area", "Attendee_Rural_Area__c"),
        FieldRule::text("Attendee_Limited_English_Proficiency", "Attendee_Limited_English_Proficiency__c"),
        FieldRule::text("Attendee_Race_ID", "Attendee_Race_ID__c"),
        FieldRule::text("Attendee_Ethnicity_ID", "Attendee_Ethnicity_ID__c"),
    ])
}

fn summary_section(summaries: &[Record]) -> Result<XmlElement> {
    let mut form = XmlElement::new(tns("Form_9902"));

    if let Some(first) = summaries.first() {
        form.push(XmlElement::text(
            tns(REPORT_PERIOD_TAG),
            first.text(REPORT_PERIOD_SOURCE).unwrap_or_default(),
        ));
    }

    let map = summary_map()?;
    for rule in map.rules() {
        for row in summaries {
            if let Some(mut element) = rule.element(row)? {
                if let Some(activity) = row.text(ACTIVITY_TYPE_SOURCE) {
                    element = element.attr("activity_type_id", activity);
                }
                form.push(element);
            }
        }
    }
    Ok(form)
}

/// Deduplicates sessions by id: first-seen order, later rows replace earlier ones.
fn unique_sessions(rows: &[Record]) -> Vec<(String, &Record)> {
    let mut order: Vec<(String, &Record)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(key) = row.text(SESSION_KEY).filter(|k| !k.is_empty()) else {
            continue;
        };
        match index.get(&key) {
            Some(&slot) => order[slot].1 = row,
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, row));
            }
        }
    }
    order
}

fn group_session_section(sessions: &[Record], attendees: &[Record]) -> Result<XmlElement> {
    let session_map = group_session_map()?;
    let attendee_map = group_session_attendee_map()?;
    let mut section = XmlElement::new(tns("Group_Sessions"));

    for (key, session) in unique_sessions(sessions) {
        let mut element = XmlElement::new(tns("Group_Session"));
        session_map.apply_into(session, &mut element)?;

        let mut nested = XmlElement::new(tns("Group_Session_Attendees"));
        for attendee in attendees.iter().filter(|a| a.text(SESSION_KEY).as_deref() == Some(key.as_str())) {
            let mut child = XmlElement::new(tns("Group_Session_Attendee"));
            attendee_map.apply_into(attendee, &mut child)?;
            nested.push(child);
        }
        element.push(nested);
        section.push(element);
    }
    Ok(section)
}

fn attendee_section(attendees: &[Record]) -> Result<XmlElement> {
    let map = attendee_map()?;
    let mut section = XmlElement::new(tns("Attendees"));
    for record in attendees {
        let mut element = XmlElement::new(tns("Attendee"));
        map.apply_into(record, &mut element)?;
        section.push(element);
    }
    Ok(section)
}

pub fn build(records: &Form9902Records) -> Result<XmlElement> {
    Ok(submission_root(FORM_9902_NAMESPACE, FORM_9902_SCHEMA)
        .child(summary_section(&records.summaries)?)
        .child(group_session_section(&records.group_sessions, &records.group_session_attendees)?)
        .child(attendee_section(&records.attendees)?))
}

/// Form 9902 document as XML text.
pub fn render(records: &Form9902Records) -> Result<String> {
    to_document(&build(records)?)
}
