//! Projection engine for single-life and second-death IHT projections
//!
//! A projection values the estate today, rolls it forward to the actuarially
//! expected death and re-runs the gift ledger and allowance calculator at that
//! date. For couples the first death passes everything, the home included, to
//! the survivor under the spousal exemption and the deceased's unused bands follow.

use chrono::NaiveDate;

use super::results::{
    ActuarialProfile, DataQuality, DataQualityIssue, FirstDeathEvent, JointProjection,
    LiabilityAssessment, Projection, SingleProjection,
};
use super::state::ProjectedEstate;
use crate::assumptions::{Assumptions, LifeExpectancy};
use crate::error::{IhtError, Result};
use crate::estate::{
    identify_residence, AssetType, Gender, Household, IhtProfile, MaritalStatus, PersonEstate,
    Residence,
};
use crate::liability::{
    add_years, calculate_allowance, clt_ledger, pet_ledger, track_spousal_transfer,
    AllowanceInput, ResidenceBequest, SpousalTransfer,
};

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    assumptions: Assumptions,
}

impl ProjectionEngine {
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Project a household: joint second-death when a partner is present
    pub fn project(&self, household: &Household, today: NaiveDate) -> Result<Projection> {
        household.validate()?;
        match &household.partner {
            Some(partner) => self
                .project_joint(&household.primary, partner, today)
                .map(Projection::Joint),
            None => self
                .project_single(&household.primary, today)
                .map(Projection::Single),
        }
    }

    /// Single-life projection; missing actuarial data degrades rather than fails
    pub fn project_single(
        &self,
        person: &PersonEstate,
        today: NaiveDate,
    ) -> Result<SingleProjection> {
        let mut quality = DataQuality::default();
        let actuarial = self.actuarial_profile("primary", person, today, &mut quality);

        let residence = self.residence_for("primary", person, &mut quality);
        let state = ProjectedEstate::from_snapshot(&person.estate);
        let current = self.assess(person, &person.profile, &state, residence, today, None)?;

        let years = actuarial.years_until_death;
        let grown = state.grown(&self.assumptions.growth, years);
        let projected = self.assess(
            person,
            &person.profile,
            &grown,
            self.grow_residence(residence, years),
            actuarial.estimated_date_of_death,
            None,
        )?;

        log::info!(
            "{}: single projection over {} years, liability {:.2} now, {:.2} at death",
            person.person_id,
            years,
            current.total_liability,
            projected.total_liability
        );

        Ok(SingleProjection {
            actuarial,
            current,
            projected,
            data_quality: quality,
        })
    }

    /// Second-death projection; both people need a date of birth and gender
    pub fn project_joint(
        &self,
        primary: &PersonEstate,
        partner: &PersonEstate,
        today: NaiveDate,
    ) -> Result<JointProjection> {
        let mut missing = primary.person.missing_fields("primary");
        missing.extend(partner.person.missing_fields("partner"));
        if !missing.is_empty() {
            return Err(IhtError::MissingActuarialInput { missing });
        }

        let mut quality = DataQuality::default();
        let primary_profile = self.actuarial_profile("primary", primary, today, &mut quality);
        let partner_profile = self.actuarial_profile("partner", partner, today, &mut quality);

        // Ties go to the primary person surviving
        let partner_survives =
            partner_profile.years_until_death > primary_profile.years_until_death;
        let (survivor, survivor_profile, deceased, deceased_profile) = if partner_survives {
            (partner, partner_profile, primary, primary_profile)
        } else {
            (primary, primary_profile, partner, partner_profile)
        };

        let survivor_residence = self.residence_for(&survivor_profile.role, survivor, &mut quality);
        let deceased_residence = self.residence_for(&deceased_profile.role, deceased, &mut quality);
        let survivor_state = ProjectedEstate::from_snapshot(&survivor.estate);
        let deceased_state = ProjectedEstate::from_snapshot(&deceased.estate);
        let combined_profile = combined_profile(survivor, deceased);

        // Both deaths today
        let current_transfer = track_spousal_transfer(
            deceased,
            today,
            deceased_state.net_estate(),
            deceased_residence.as_ref(),
            ResidenceBequest::Spouse,
            &self.assumptions.tax,
        )?;
        let current = self.assess(
            survivor,
            &combined_profile,
            &survivor_state.combined(&deceased_state),
            combine_residences(survivor_residence, deceased_residence),
            today,
            Some(&current_transfer),
        )?;

        // First death: spousal exemption, nothing due
        let first_years = deceased_profile.years_until_death;
        let first_date = deceased_profile.estimated_date_of_death;
        let growth = &self.assumptions.growth;
        let survivor_at_first = survivor_state.grown(growth, first_years);
        let deceased_at_first = deceased_state.grown(growth, first_years);
        let deceased_residence_at_first = self.grow_residence(deceased_residence, first_years);

        let spousal_transfer = track_spousal_transfer(
            deceased,
            first_date,
            deceased_at_first.net_estate(),
            deceased_residence_at_first.as_ref(),
            ResidenceBequest::Spouse,
            &self.assumptions.tax,
        )?;

        let combined_at_first = survivor_at_first.combined(&deceased_at_first);
        let first_death = FirstDeathEvent {
            date: first_date,
            deceased_person_id: deceased.person_id.clone(),
            years_from_today: first_years,
            deceased_estate: deceased_at_first.gross_estate(),
            survivor_estate: survivor_at_first.gross_estate(),
            combined_value_passing: combined_at_first.gross_estate(),
            iht_due: 0.0,
            spousal_exemption_applied: true,
        };

        // Second death
        let second_years = survivor_profile.years_until_death;
        let additional_years = second_years.saturating_sub(first_years);
        let combined_at_second = combined_at_first.grown(growth, additional_years);
        let residence_at_second = self.grow_residence(
            combine_residences(survivor_residence, deceased_residence),
            second_years,
        );

        let projected = self.assess(
            survivor,
            &combined_profile,
            &combined_at_second,
            residence_at_second,
            survivor_profile.estimated_date_of_death,
            Some(&spousal_transfer),
        )?;

        log::info!(
            "{}: joint projection, first death in {} years ({}), second in {} years, \
             liability {:.2}",
            primary.person_id,
            first_years,
            deceased.person_id,
            second_years,
            projected.total_liability
        );

        Ok(JointProjection {
            survivor: survivor_profile,
            deceased: deceased_profile,
            first_death,
            spousal_transfer,
            current,
            projected,
            data_quality: quality,
        })
    }

    /// Life expectancy and projected death date for one person
    fn actuarial_profile(
        &self,
        role: &str,
        person: &PersonEstate,
        today: NaiveDate,
        quality: &mut DataQuality,
    ) -> ActuarialProfile {
        let age = person.person.age_on(today);

        let (gender, life_expectancy) = match (age, person.person.gender) {
            (None, gender) => {
                quality.flag(DataQualityIssue::MissingDateOfBirth {
                    role: role.to_string(),
                });
                (gender, None)
            }
            (Some(age), Some(gender)) => (Some(gender), Some(self.life_expectancy(age, gender))),
            (Some(age), None) => {
                let (assumed, le) = self.shorter_life_expectancy(age);
                quality.flag(DataQualityIssue::GenderAssumed {
                    role: role.to_string(),
                    assumed,
                });
                (Some(assumed), Some(le))
            }
        };

        if life_expectancy.is_some_and(|le| le.is_fallback()) {
            quality.flag(DataQualityIssue::NoLifeTableData {
                role: role.to_string(),
            });
        }

        let years_until_death = life_expectancy.map(|le| le.rounded_years()).unwrap_or(0);

        ActuarialProfile {
            role: role.to_string(),
            person_id: person.person_id.clone(),
            age,
            gender,
            life_expectancy,
            years_until_death,
            estimated_age_at_death: age.map(|a| a + years_until_death),
            estimated_date_of_death: add_years(today, years_until_death),
        }
    }

    fn life_expectancy(&self, age: u32, gender: Gender) -> LifeExpectancy {
        self.assumptions.life_table.life_expectancy(age, gender)
    }

    /// The gender giving the shorter expectancy at this age
    fn shorter_life_expectancy(&self, age: u32) -> (Gender, LifeExpectancy) {
        let male = self.life_expectancy(age, Gender::Male);
        let female = self.life_expectancy(age, Gender::Female);
        if female.years < male.years {
            (Gender::Female, female)
        } else {
            (Gender::Male, male)
        }
    }

    fn residence_for(
        &self,
        role: &str,
        person: &PersonEstate,
        quality: &mut DataQuality,
    ) -> Option<Residence> {
        let residence = identify_residence(&person.profile, &person.estate);
        if residence.is_some_and(|r| !r.is_authoritative()) {
            quality.flag(DataQualityIssue::ResidenceInferredFromName {
                role: role.to_string(),
            });
        }
        residence
    }

    fn grow_residence(&self, residence: Option<Residence>, years: u32) -> Option<Residence> {
        residence.map(|r| r.grown(self.assumptions.growth.factor(AssetType::Property, years)))
    }

    /// Run the gift ledgers and allowance calculator against one estate state
    fn assess(
        &self,
        person: &PersonEstate,
        profile: &IhtProfile,
        state: &ProjectedEstate,
        residence: Option<Residence>,
        valuation_date: NaiveDate,
        spousal_transfer: Option<&SpousalTransfer>,
    ) -> Result<LiabilityAssessment> {
        let params = &self.assumptions.tax;
        let net_estate = state.net_estate();

        let mut input = AllowanceInput::for_profile(profile, net_estate, residence, 0.0);
        if let Some(transfer) = spousal_transfer {
            input.marital_status = MaritalStatus::Widowed;
            input.transferred_nrb = transfer.transferable_nrb;
            input.transferred_rnrb = transfer.transferable_rnrb;
        }

        let total_nrb = params.nrb + input.transferred_nrb.min(params.nrb);
        let pets = pet_ledger(&person.gifts, valuation_date, total_nrb, params)?;
        let clts = clt_ledger(&person.gifts, valuation_date, params)?;

        input.nrb_used_by_gifts = pets.nrb_used_by_gifts;
        let allowance = calculate_allowance(&input, params)?;

        let estate_liability = allowance.liability;
        let gifting_liability = pets.total_tax;

        Ok(LiabilityAssessment {
            valuation_date,
            gross_estate: state.gross_estate(),
            exempt_assets: state.exempt_assets(),
            liabilities: state.liabilities,
            net_estate,
            residence,
            pet_ledger: pets,
            clt_ledger: clts,
            allowance,
            estate_liability,
            gifting_liability,
            total_liability: estate_liability + gifting_liability,
        })
    }
}

/// Survivor's profile after inheriting the deceased's estate
fn combined_profile(survivor: &PersonEstate, deceased: &PersonEstate) -> IhtProfile {
    let mut profile = survivor.profile.clone();
    profile.own_home = survivor.profile.own_home || deceased.profile.own_home;
    profile
}

fn combine_residences(a: Option<Residence>, b: Option<Residence>) -> Option<Residence> {
    match (a, b) {
        (Some(a), Some(b)) => Some(Residence {
            value: a.value + b.value,
            source: if a.is_authoritative() { b.source } else { a.source },
        }),
        (one, None) | (None, one) => one,
    }
}
