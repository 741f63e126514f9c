use super::error::Error;

/// Avogadro's number, mol⁻¹.
pub const AVOGADRO: f64 = 6.02214075e23;

/// Molar mass of H₂O, g/mol.
pub const WATER_MOLAR_MASS: f64 = 18.0152;

const CUBIC_ANGSTROM_TO_CM3: f64 = 1e-24;

/// Number of water molecules filling `volume` Å³ at `density` g/cm³.
///
/// Truncates toward zero; fractional molecules are dropped.
pub fn molecules_from_density(volume: f64, density: f64) -> u64 {
    let volume_cm3 = volume * CUBIC_ANGSTROM_TO_CM3;
    (AVOGADRO * volume_cm3 * density / WATER_MOLAR_MASS).floor() as u64
}

/// Resolves the molecule count of a region from its construction options.
///
/// `volume` is `None` for shapes without a finite enclosed volume.
pub(crate) fn resolve_count(
    label: &str,
    volume: Option<f64>,
    number: Option<u64>,
    density: Option<f64>,
) -> Result<u64, Error> {
    match (number, density) {
        (Some(n), None) => Ok(n),
        (None, Some(density)) => {
            if !density.is_finite() || density <= 0.0 {
                return Err(Error::invalid_argument(format!(
                    "density must be a positive number of g/cm³, got {}",
                    density
                )));
            }
            let volume = volume.ok_or_else(|| {
                Error::invalid_argument(format!(
                    "'{}' encloses no finite volume; give an explicit `number`",
                    label
                ))
            })?;
            let count = molecules_from_density(volume, density);
            log::debug!(
                "{} of {:.3} Å³ at {} g/cm³ holds {} molecules",
                label,
                volume,
                density,
                count
            );
            Ok(count)
        }
        (number, density) => Err(Error::DensityAmbiguity { number, density }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_slab_at_ambient_density() {
        let volume = 143.0 * 143.0 * 357.0;
        assert_eq!(molecules_from_density(volume, 0.998), 243546);
    }

    #[test]
    fn truncates_fractional_molecules() {
        // 1000 Å³ at 1 g/cm³ is 33.43 molecules.
        assert_eq!(molecules_from_density(1000.0, 1.0), 33);
        assert_eq!(molecules_from_density(0.0, 1.0), 0);
    }

    #[test]
    fn monotonic_in_density_and_volume() {
        let mut last = 0;
        for step in 1..=20 {
            let n = molecules_from_density(64_000.0, step as f64 * 0.1);
            assert!(n >= last);
            last = n;
        }

        let mut last = 0;
        for side in 1..=40 {
            let n = molecules_from_density((side as f64).powi(3), 0.998);
            assert!(n >= last);
            last = n;
        }
    }

    #[test]
    fn explicit_number_wins_without_density() {
        assert_eq!(resolve_count("plane", None, Some(500), None).unwrap(), 500);
    }

    #[test]
    fn density_uses_volume() {
        assert_eq!(
            resolve_count("cube", Some(64_000.0), None, Some(1.0)).unwrap(),
            molecules_from_density(64_000.0, 1.0)
        );
    }

    #[test]
    fn both_or_neither_is_ambiguous() {
        assert!(matches!(
            resolve_count("cube", Some(1.0), Some(3), Some(1.0)),
            Err(Error::DensityAmbiguity {
                number: Some(3),
                density: Some(_)
            })
        ));
        assert!(matches!(
            resolve_count("cube", Some(1.0), None, None),
            Err(Error::DensityAmbiguity {
                number: None,
                density: None
            })
        ));
    }

    #[test]
    fn density_without_volume_is_invalid() {
        let err = resolve_count("plane", None, None, Some(1.0)).unwrap_err();
        match err {
            Error::InvalidArgument(msg) => assert!(msg.contains("plane")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn non_positive_density_is_invalid() {
        for density in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                resolve_count("cube", Some(1.0), None, Some(density)),
                Err(Error::InvalidArgument(_))
            ));
        }
    }
}
