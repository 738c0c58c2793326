use super::{frame_transcript, render_placeholders};
use crate::pipeline::Stage;

/// Every stage template opens with `Stage: <action name>`.
pub const STAGE_MARKER_PREFIX: &str = "Stage: ";

const IDENTIFY_STAKEHOLDERS_TEMPLATE: &str = r#"Stage: {{stage}}

## Introduction:
Imagine you are a **requirements analyst** defining the stakeholders and end users for the problem statement below. Identify every individual or group who interacts with, or is affected by, the system.

## Problem Statement:
{{problem_statement}}

## Task:
- Identify and categorize **all relevant stakeholders** interacting with or impacted by the system.
- Separate **primary end users** (direct users) from **secondary stakeholders** (indirectly affected users).

## Instructions:
1. Classify stakeholders as **primary (direct users)** or **secondary (indirect users)**.
2. For each stakeholder give:
   - Their **role** in using or managing the system.
   - Their **expectations and concerns** about the system.
3. Identify **potential conflicts** between stakeholders and suggest how to resolve them.
4. Include **external regulatory bodies** where they apply.

## Closing:
With the stakeholders identified, the next step is to apply elicitation techniques such as interviews, surveys and observation to gather detailed requirements."#;

const IDENTIFY_STAKEHOLDERS_REQUEST: &str =
    r#"Give me a list of "stakeholders" and "endUsers" separately."#;

const ELICITATION_TECHNIQUES_TEMPLATE: &str = r#"Stage: {{stage}}

## Introduction:
You are a **requirements analyst** selecting the best **elicitation techniques** for gathering system requirements from the identified stakeholders and end users.

## Identified Stakeholders:
{{stakeholders}}

## Task:
1. Recommend the most appropriate **elicitation technique(s)** for each stakeholder group.
2. Justify why each technique is the best fit for capturing that group's requirements.
3. Present the result as a **table** with the columns:
   - **Stakeholder Name**
   - **Elicitation Techniques** (interviews, surveys, observation, prototyping, focus groups, workshops, ...)
   - **Justification for Choosing the Technique**

## Instructions:
1. Assign **at least one technique** per stakeholder group.
2. Base each justification on the group's role, responsibilities and influence over the system.
3. Cover **both functional and non-functional requirements**.

## Closing:
Once techniques are chosen, they are applied in practice to refine the system requirements."#;

const ELICITATION_TECHNIQUES_REQUEST: &str =
    "Generate a structured list of elicitation techniques for each stakeholder with justifications.";

const JUSTIFY_ELICITATION_TEMPLATE: &str = r#"Stage: {{stage}}

## Introduction:
You are a **requirements analyst** evaluating and explaining the **effectiveness** of the elicitation techniques selected for this system.

## Elicitation Techniques Mapping:
{{elicitation_techniques}}

## Task:
For each stakeholder, provide:
1. A **clear justification** of why the chosen technique is the best fit.
2. An explanation of **how the technique ensures effective requirement gathering**.
3. Any **alternative techniques** that would also be suitable.

## Instructions:
1. Justify the selected technique for each stakeholder by explaining why it is the most effective.
2. Describe how it extracts meaningful, actionable system requirements.
3. Recommend alternative elicitation methods where they would improve the process.

## Closing:
With the right techniques every stakeholder need is captured; the next step is to write and validate user stories."#;

const JUSTIFY_ELICITATION_REQUEST: &str = "Provide a detailed justification of why each elicitation technique is effective and how it helps in gathering requirements.";

const GENERATE_USER_STORIES_TEMPLATE: &str = r#"Stage: {{stage}}

## Introduction:
You are a **requirements analyst** defining the system's functionality as **detailed user stories**. Every story describes the interaction, covering both **successful operation and failure scenarios**.

## Stakeholders & Users:
{{stakeholders}}

## Task:
Generate **at least 15 user stories** across the user types above. Every story must include:
1. The **Front & Back of the Card** format.
2. **Success scenarios** covering all correct system behaviour.
3. **Failure scenarios with display messages**, itemized as:
   - **System failures** (backend outages, transaction errors).
   - **User input errors** (invalid data, invalid selections).
   - **Hardware or environment faults** where relevant.
   - **Security concerns** (fraud, unauthorized access).

## Instructions:
1. Write **at least 15 user stories** spread over the different users.
2. Detail success and failure cases fully for each story.
3. List every failure scenario with a clear, user-friendly message.
4. Do not reuse failure lists between stories; each story gets its own breakdown.

## Closing:
Well-structured user stories give a shared understanding of the requirements; next they are validated and refined."#;

const GENERATE_USER_STORIES_REQUEST: &str = "Generate a **list of 15 user stories** ensuring **detailed success and failure scenarios** with display messages for each failure case.";

const INVEST_VALIDATION_TEMPLATE: &str = r#"Stage: {{stage}}

## Introduction:
You are an **Agile Coach & Requirements Analyst** validating user stories with the **INVEST framework** so that each story is ready for development.

## User Stories for Validation:
{{user_stories}}

## Task:
Apply INVEST validation to **every** user story and report strengths and weaknesses in the format below.

---

## INVEST Validation Format:

### Front of the Card:
_As a [user role], I want to [goal] so that [benefit]._

### Back of the Card:
1. **Validation Results:**
   - **Independent:** (Pass/Fail) + Justification
   - **Negotiable:** (Pass/Fail) + Justification
   - **Valuable:** (Pass/Fail) + Justification
   - **Estimable:** (Pass/Fail) + Justification
   - **Small:** (Pass/Fail) + Justification
   - **Testable:** (Pass/Fail) + Justification
2. **Suggested Improvements (if needed):**
   - Specific recommendations for every failed criterion.

---

## Instructions:
1. Validate all user stories above.
2. State Pass/Fail for each criterion with a justification.
3. Suggest concrete improvements where needed.
4. Put `---` before every user story.

## Closing:
Validated stories are clear, well structured and ready for the development backlog."#;

const INVEST_VALIDATION_REQUEST: &str = "Validate the user stories using the **INVEST framework** and provide detailed feedback. **Do this for every user story** and **follow the front and back of the card format**.";

const PRIORITIZE_TEMPLATE: &str = r#"Stage: {{stage}}

Introduction:
Act as an Agile Coach & Requirements Analyst. Categorize the validated user stories with the MoSCoW prioritization method.

---

Validated User Stories:
{{validated_stories}}

---

Task:
1. Assign every validated story one MoSCoW priority:
   - Must-have (M): essential for core functionality; required in the first release.
   - Should-have (S): important but not immediately necessary.
   - Could-have (C): improves experience or efficiency; not critical.
   - Won't-have (W): not required for this release.
2. Justify each classification with these factors:
   - Business Value
   - Urgency
   - Feasibility
   - Security & Compliance
   - Performance & Usability
   - Dependencies
3. Use this format:

User Story:
"As a [user role], I want to [goal] so that [benefit]."

MoSCoW Classification:
- **Priority:** Must-have (M) / Should-have (S) / Could-have (C) / Won't-have (W)
- **Justification:** one line per factor, each scored out of 5.

---

Example:

User Story:
"As a customer, I want to log in with my credentials so that I can access my account securely."

MoSCoW Classification:
- **Priority:** Must-have (M)
- **Justification:**
  - Business Value: essential for authentication (5/5).
  - Urgency: required before any other feature (5/5).
  - Feasibility: well-established implementation (5/5).
  - Security & Compliance: protects user credentials (5/5).
  - Performance & Usability: low performance impact (4/5).
  - Dependencies: every account feature depends on it (5/5).

---

Closing:
MoSCoW prioritization makes sure essential functionality ships first while balancing value, feasibility and user needs."#;

const PRIORITIZE_REQUEST: &str = "Using the MoSCoW method, prioritize the validated user stories considering business value, security, feasibility, urgency and performance. **Cover every user story.**";

const EPIC_CONFLICT_TEMPLATE: &str = r#"Stage: {{stage}}

### Validated User Stories:
{{validated_stories}}

---

### Task:
1. **Group related user stories into EPICs** by broader functionality.
2. **Identify at least three EPICs** that contain conflicting user stories.
3. **Analyze each conflict**, considering:
   - **Functional conflicts** (contradicting feature requirements)
   - **Non-functional conflicts** (security vs. usability)
   - **Resource conflicts** (performance vs. cost)
   - **Stakeholder conflicts** (different priorities between user groups)
4. **Propose a resolution strategy** balancing user needs, technical feasibility and business priorities.
5. Use this format:

#### **EPIC Name: [Broad Functionality]**
- **Conflicting User Stories:**
  - Story 1: _As a [user], I want to [goal] so that [benefit]._
  - Story 2: _As a [user], I want to [goal] so that [benefit]._
- **Conflict Type:** [Functional / Non-functional / Resource / Stakeholder]
- **Conflict Analysis:** the nature of the conflict and its impact on system design.
- **Resolution Strategy:** a feasible solution aligned with business objectives and technical constraints.

---

### Example:

#### **EPIC: Secure User Access**
- **Conflicting User Stories:**
  - _As a customer, I want to log in with biometrics so that I can access my account quickly._
  - _As an admin, I want strict two-factor authentication so that unauthorized users cannot get in._
- **Conflict Type:** Non-functional (security vs. usability)
- **Conflict Analysis:** biometrics speed up access but may not satisfy regulatory requirements; two-factor authentication adds friction for frequent users.
- **Resolution Strategy:** adaptive authentication; high-risk actions require 2FA, low-risk logins accept biometrics.

---

### Closing:
Resolving these conflicts keeps the system aligned with both user needs and technical constraints."#;

const EPIC_CONFLICT_REQUEST: &str = "Analyze the validated user stories and identify three EPICs where conflicts exist. Provide a detailed analysis of each conflict and suggest resolution strategies. **The output must be complete and well structured.**";

fn render(stage: Stage, template: &str, key: &str, value: &str, request: &str) -> String {
    let instructions = render_placeholders(template, &[("stage", stage.as_str()), (key, value)]);
    frame_transcript(&instructions, request)
}

pub fn render_identify_stakeholders(problem_statement: &str) -> String {
    render(
        Stage::IdentifyStakeholders,
        IDENTIFY_STAKEHOLDERS_TEMPLATE,
        "problem_statement",
        problem_statement,
        IDENTIFY_STAKEHOLDERS_REQUEST,
    )
}

pub fn render_elicitation_techniques(stakeholders: &str) -> String {
    render(
        Stage::ElicitationTechniques,
        ELICITATION_TECHNIQUES_TEMPLATE,
        "stakeholders",
        stakeholders,
        ELICITATION_TECHNIQUES_REQUEST,
    )
}

pub fn render_justify_elicitation(elicitation_techniques: &str) -> String {
    render(
        Stage::JustifyElicitation,
        JUSTIFY_ELICITATION_TEMPLATE,
        "elicitation_techniques",
        elicitation_techniques,
        JUSTIFY_ELICITATION_REQUEST,
    )
}

pub fn render_generate_user_stories(stakeholders: &str) -> String {
    render(
        Stage::GenerateUserStories,
        GENERATE_USER_STORIES_TEMPLATE,
        "stakeholders",
        stakeholders,
        GENERATE_USER_STORIES_REQUEST,
    )
}

pub fn render_invest_validation(user_stories: &str) -> String {
    render(
        Stage::InvestValidation,
        INVEST_VALIDATION_TEMPLATE,
        "user_stories",
        user_stories,
        INVEST_VALIDATION_REQUEST,
    )
}

pub fn render_prioritize(validated_stories: &str) -> String {
    render(
        Stage::Prioritize,
        PRIORITIZE_TEMPLATE,
        "validated_stories",
        validated_stories,
        PRIORITIZE_REQUEST,
    )
}

pub fn render_epic_conflict_analysis(validated_stories: &str) -> String {
    render(
        Stage::EpicConflictAnalysis,
        EPIC_CONFLICT_TEMPLATE,
        "validated_stories",
        validated_stories,
        EPIC_CONFLICT_REQUEST,
    )
}
