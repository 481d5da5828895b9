//! Query text for each report section.
//!
//! Ids are only interpolated after [`CaseId`] validation, so they cannot
//! carry quotes.

use armlink_domain::constants::SETTINGS_OBJECT;
use armlink_domain::CaseId;

const CLIENT_PROFILE_FIELDS: &[&str] = &[
    "Id",
    "Client_ID_Num__c",
    "Client_Case_Num__c",
    "Client_City__c",
    "Client_State__c",
    "Client_Zip__c",
    "Client_New_City__c",
    "Client_New_State__c",
    "Client_New_Zip__c",
    "Client_Family_Size__c",
    "Client_Gender__c",
    "Client_Marital_Status__c",
    "Client_Race_ID__c",
    "Client_Ethnicity_ID__c",
    "Client_Household_Gross_Monthly_Income__c",
    "Client_Head_Of_Household_Type__c",
    "Client_Counselor_ID__c",
    "Client_Counselor_HUD_Id__c",
    "Client_Highest_Educ_Grade__c",
    "Client_Farm_Worker__c",
    "Client_Rural_Area__c",
    "Client_Limited_English_Proficiency__c",
    "Client_Colonias_Resident__c",
    "Client_HUD_Assistance__c",
    "Client_Disabled__c",
    "Client_Dependents_Num__c",
    "Client_Intake_DT__c",
    "Client_Counsel_Start_Session_DateTime__c",
    "Client_Counsel_End_Session_DateTime__c",
    "Client_Language_Spoken__c",
    "Client_Session_Duration__c",
    "Client_Counseling_Type__c",
    "Client_Counseling_Termination__c",
    "Client_Counseling_Fee__c",
    "Client_Attribute_HUD_Grant__c",
    "Client_Grant_Amount_Used__c",
    "Client_HECM_Certificate__c",
    "Client_HECM_Certificate_Issue_Date__c",
    "Client_HECM_Certificate_Expiration_Date__c",
    "Client_HECM_Certificate_ID__c",
    "Client_Predatory_Lending__c",
    "Client_Mortgage_Type__c",
    "Client_Mortgage_Type_After__c",
    "Client_Finance_Type_Before__c",
    "Client_Finance_Type_After__c",
    "Client_FirstTime_Home_Buyer__c",
    "Client_Discrimination_Victim__c",
    "Client_Mortgage_Closing_Cost__c",
    "Client_Mortgage_Interest_Rate__c",
    "Client_Referred_By__c",
    "Client_Sales_Contract_Signed__c",
    "Client_Credit_Score__c",
    "Client_No_Credit_Score_Reason__c",
    "Client_Credit_Score_Source__c",
    "Client_Job_Duration__c",
    "Client_Household_Debt__c",
    "Client_Mortgage_Deliquency__c",
    "Client_Loan_Being_Reported__c",
    "Client_Second_Loan_Exists__c",
    "Client_Intake_Loan_Type__c",
    "Client_Intake_Loan_Type_Is_Hybrid_ARM__c",
    "Client_Intake_Loan_Type_Is_Option_ARM__c",
    "Client_Intake_Loan_Type_Is_Interest_Only__c",
    "Client_Intake_Loan_Type_Is_FHA_Or_VA_Ins__c",
    "Loan_Type_Is_Privately_Held__c",
    "Loan_Type_Has_Interest_Rate_Reset__c",
    "Client_Income_Level__c",
    "Client_Purpose_Of_Visit__c",
    "Client_Activity_Type__c",
    "Client_Outcome__c",
    "X9902ReportingQuarter__c",
];

const GROUP_SESSION_FIELDS: &[&str] = &[
    "Id",
    "Group_Session_Id__c",
    "Group_Session_Counselor_Id__c",
    "Group_Session_Counselor_HUD_Id__c",
    "Group_Session_Title__c",
    "Group_Session_Date__c",
    "Group_Session_Duration__c",
    "Group_Session_Type__c",
    "Group_Session_Attribute_HUD_Grant__c",
    "Group_Session_Activity_Type__c",
];

const GROUP_SESSION_ATTENDEE_FIELDS: &[&str] = &[
    "Id",
    "Group_Session_Id__c",
    "Group_Session_Attendee_ID__c",
    "Attendee_Fee_Amount__c",
    "Attendee_Referred_By__c",
    "Attendee_FirstTime_Home_Buyer__c",
    "Group_Session_Attendee_Income_Level__c",
    "Group_Session_Attendee_City__c",
    "Group_Session_Attendee_State__c",
    "Group_Session_Attendee_Zip_Code__c",
    "Group_Session_Attendee_Rural_Area_Status__c",
    "Grp_Attendee_Limited_English_Proficiency__c",
];

const ATTENDEE_FIELDS: &[&str] = &[
    "Id",
    "Attendee_ID__c",
    "Attendee_Income_Level__c",
    "Attendee_City__c",
    "Attendee_State__c",
    "Attendee_Zip_Code__c",
    "Attendee_Rural_Area__c",
    "Attendee_Limited_English_Proficiency__c",
    "Attendee_Race_ID__c",
    "Attendee_Ethnicity_ID__c",
];

/// Agency credentials custom setting.
pub fn integration_settings(settings_name: &str) -> String {
    format!(
        "SELECT Name, EndpointURL__c, AgencyId__c, AgencyName__c, Username__c, Password__c, \
         CMSPassword__c, VendorId__c FROM {SETTINGS_OBJECT} WHERE Name = '{}'",
        settings_name.replace('\\', "\\\\").replace('\'', "\\'")
    )
}

pub fn client_profiles(case: &CaseId) -> String {
    format!(
        "SELECT {} FROM X9902_Client__c WHERE X9902__c = '{case}'",
        CLIENT_PROFILE_FIELDS.join(", ")
    )
}

/// Form 9902 summary rows; the selected columns follow the summary tag table.
pub fn form_9902_summary(case: &CaseId, fields: &[&str]) -> String {
    let mut columns = vec!["Id", "Activity_type_id__c"];
    for field in fields {
        if !columns.contains(field) {
            columns.push(field);
        }
    }
    format!(
        "SELECT {} FROM X9902Summary__c WHERE X9902__c = '{case}' AND Element_Type__c = '9902'",
        columns.join(", ")
    )
}

pub fn group_sessions(case: &CaseId) -> String {
    format!(
        "SELECT {} FROM X9902Summary__c WHERE X9902__c = '{case}' \
         AND Element_Type__c = 'Group Session' AND Group_Session_Id__c != NULL",
        GROUP_SESSION_FIELDS.join(", ")
    )
}

pub fn group_session_attendees(case: &CaseId) -> String {
    format!(
        "SELECT {} FROM X9902Summary__c WHERE X9902__c = '{case}' \
         AND Element_Type__c = 'Group Session Attendee' AND Group_Session_Id__c != NULL",
        GROUP_SESSION_ATTENDEE_FIELDS.join(", ")
    )
}

pub fn attendees(case: &CaseId) -> String {
    format!(
        "SELECT {} FROM X9902Summary__c WHERE X9902__c = '{case}' AND Element_Type__c = 'Attendee'",
        ATTENDEE_FIELDS.join(", ")
    )
}
