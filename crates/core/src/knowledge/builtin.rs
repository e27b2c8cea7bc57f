use rust_decimal::Decimal;

use crate::domain::ingredient::{
    Ingredient, IngredientCategory as Category, IrritationPotential as Irritation, SkinType,
};
use crate::domain::rule::{ConflictRule, Severity};

use super::KnowledgeBaseBuilder;

pub const BUILTIN_VERSION: &str = "builtin-2026.10";

fn tenths(value: i64) -> Decimal {
    Decimal::new(value, 1)
}

fn hundredths(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

pub(super) fn builder() -> KnowledgeBaseBuilder {
    let builder = KnowledgeBaseBuilder::default().version(BUILTIN_VERSION);
    let builder = ingredients().into_iter().fold(builder, KnowledgeBaseBuilder::ingredient);
    let builder = rules().into_iter().fold(builder, KnowledgeBaseBuilder::rule);
    keyword_tables(builder)
}

fn ingredients() -> Vec<Ingredient> {
    use SkinType::*;

    vec![
        Ingredient::new("retinol", "Retinol", Category::Active)
            .with_inci("Retinol")
            .with_aliases(["retinyl palmitate", "retinyl retinoate", "vitamin a", "retinoid"])
            .with_purposes(["anti-aging", "cell turnover", "acne"])
            .with_irritation(Irritation::High)
            .with_ph(tenths(50), tenths(60))
            .with_concentration(hundredths(1), tenths(10))
            .suited_for([Normal, Oily, Combination])
            .avoid_for([Sensitive])
            .not_pregnancy_safe()
            .photosensitizing()
            .synergizes_with(["ceramides", "niacinamide"]),
        Ingredient::new("retinal", "Retinal", Category::Active)
            .with_inci("Retinal")
            .with_aliases(["retinaldehyde"])
            .with_purposes(["anti-aging", "cell turnover"])
            .with_irritation(Irritation::High)
            .with_ph(tenths(50), tenths(60))
            .with_concentration(hundredths(1), hundredths(20))
            .avoid_for([Sensitive])
            .not_pregnancy_safe()
            .photosensitizing(),
        Ingredient::new("tretinoin", "Tretinoin", Category::Active)
            .with_inci("Tretinoin")
            .with_aliases(["retinoic acid", "all-trans retinoic acid", "retin-a"])
            .with_purposes(["anti-aging", "acne"])
            .with_irritation(Irritation::High)
            .with_concentration(hundredths(1), hundredths(10))
            .avoid_for([Sensitive, Dry])
            .not_pregnancy_safe()
            .photosensitizing(),
        Ingredient::new("adapalene", "Adapalene", Category::Active)
            .with_inci("Adapalene")
            .with_aliases(["differin"])
            .with_purposes(["acne"])
            .with_irritation(Irritation::Medium)
            .with_concentration(hundredths(10), hundredths(30))
            .suited_for([Oily, AcneProne])
            .not_pregnancy_safe()
            .photosensitizing(),
        Ingredient::new("benzoyl-peroxide", "Benzoyl Peroxide", Category::Active)
            .with_inci("Benzoyl Peroxide")
            .with_aliases(["bpo"])
            .with_purposes(["acne", "antibacterial"])
            .with_irritation(Irritation::High)
            .with_concentration(tenths(25), tenths(100))
            .suited_for([Oily, AcneProne])
            .avoid_for([Dry, Sensitive]),
        Ingredient::new("vitamin-c", "Vitamin C", Category::Active)
            .with_inci("Ascorbic Acid")
            .with_aliases(["l-ascorbic acid", "vit c"])
            .with_purposes(["brightening", "antioxidant", "collagen support"])
            .with_irritation(Irritation::Medium)
            .with_ph(tenths(25), tenths(35))
            .with_concentration(tenths(50), tenths(200))
            .synergizes_with(["vitamin-e", "ferulic-acid"]),
        Ingredient::new("glycolic-acid", "Glycolic Acid", Category::Active)
            .with_inci("Glycolic Acid")
            .with_aliases(["aha", "glycolic"])
            .with_purposes(["exfoliation", "brightening"])
            .with_irritation(Irritation::High)
            .with_ph(tenths(30), tenths(40))
            .with_concentration(tenths(50), tenths(100))
            .avoid_for([Sensitive])
            .photosensitizing(),
        Ingredient::new("lactic-acid", "Lactic Acid", Category::Active)
            .with_inci("Lactic Acid")
            .with_aliases(["sodium lactate"])
            .with_purposes(["exfoliation", "hydration"])
            .with_irritation(Irritation::Medium)
            .with_ph(tenths(35), tenths(40))
            .with_concentration(tenths(50), tenths(120))
            .photosensitizing(),
        Ingredient::new("mandelic-acid", "Mandelic Acid", Category::Exfoliant)
            .with_inci("Mandelic Acid")
            .with_purposes(["exfoliation"])
            .with_ph(tenths(33), tenths(40))
            .with_concentration(tenths(50), tenths(100))
            .suited_for([Sensitive, AcneProne])
            .photosensitizing(),
        Ingredient::new("salicylic-acid", "Salicylic Acid", Category::Active)
            .with_inci("Salicylic Acid")
            .with_aliases(["bha", "beta hydroxy acid", "willow bark extract"])
            .with_purposes(["exfoliation", "acne", "pore clearing"])
            .with_irritation(Irritation::Medium)
            .with_ph(tenths(30), tenths(40))
            .with_concentration(tenths(5), tenths(20))
            .suited_for([Oily, AcneProne, Combination])
            .avoid_for([Dry]),
        Ingredient::new("azelaic-acid", "Azelaic Acid", Category::Active)
            .with_inci("Azelaic Acid")
            .with_purposes(["acne", "redness", "brightening"])
            .with_irritation(Irritation::Low)
            .with_ph(tenths(45), tenths(55))
            .with_concentration(tenths(100), tenths(200))
            .suited_for([Sensitive, AcneProne])
            .synergizes_with(["niacinamide"]),
        Ingredient::new("hydroquinone", "Hydroquinone", Category::Active)
            .with_inci("Hydroquinone")
            .with_purposes(["brightening"])
            .with_irritation(Irritation::Medium)
            .with_concentration(tenths(20), tenths(40))
            .not_pregnancy_safe(),
        Ingredient::new("niacinamide", "Niacinamide", Category::Antioxidant)
            .with_inci("Niacinamide")
            .with_aliases(["vitamin b3", "nicotinamide"])
            .with_purposes(["barrier support", "oil control", "brightening"])
            .with_ph(tenths(50), tenths(65))
            .with_concentration(tenths(20), tenths(100))
            .suited_for([Normal, Oily, Combination, Sensitive, AcneProne])
            .synergizes_with(["hyaluronic-acid"]),
        Ingredient::new("hyaluronic-acid", "Hyaluronic Acid", Category::Humectant)
            .with_inci("Sodium Hyaluronate")
            .with_aliases(["hyaluronan"])
            .with_purposes(["hydration"])
            .with_ph(tenths(50), tenths(65))
            .with_concentration(hundredths(10), tenths(20))
            .suited_for([Normal, Dry, Oily, Combination, Sensitive, AcneProne]),
        Ingredient::new("glycerin", "Glycerin", Category::Humectant)
            .with_inci("Glycerin")
            .with_aliases(["glycerol", "glycerine"])
            .with_purposes(["hydration"])
            .suited_for([Dry, Normal]),
        Ingredient::new("ceramides", "Ceramides", Category::Emollient)
            .with_aliases(["ceramide np", "ceramide ap", "ceramide eop"])
            .with_purposes(["barrier support"])
            .suited_for([Dry, Sensitive]),
        Ingredient::new("squalane", "Squalane", Category::Emollient)
            .with_inci("Squalane")
            .with_purposes(["moisturizing"])
            .with_comedogenic_rating(1)
            .suited_for([Dry, Normal]),
        Ingredient::new("petrolatum", "Petrolatum", Category::Occlusive)
            .with_inci("Petrolatum")
            .with_aliases(["petroleum jelly", "vaseline"])
            .with_purposes(["barrier support", "occlusion"])
            .suited_for([Dry]),
        Ingredient::new("coconut-oil", "Coconut Oil", Category::Emollient)
            .with_inci("Cocos Nucifera Oil")
            .with_purposes(["moisturizing"])
            .with_comedogenic_rating(4)
            .avoid_for([Oily, AcneProne]),
        Ingredient::new("vitamin-e", "Vitamin E", Category::Antioxidant)
            .with_inci("Tocopherol")
            .with_aliases(["tocopheryl acetate"])
            .with_purposes(["antioxidant"])
            .with_comedogenic_rating(2)
            .synergizes_with(["ferulic-acid"]),
        Ingredient::new("ferulic-acid", "Ferulic Acid", Category::Antioxidant)
            .with_inci("Ferulic Acid")
            .with_purposes(["antioxidant"]),
        Ingredient::new("peptides", "Peptides", Category::Peptide)
            .with_aliases(["palmitoyl pentapeptide-4", "palmitoyl tripeptide-1", "matrixyl"])
            .with_purposes(["anti-aging", "firming"])
            .with_ph(tenths(60), tenths(80)),
        Ingredient::new("copper-peptides", "Copper Peptides", Category::Peptide)
            .with_inci("Copper Tripeptide-1")
            .with_aliases(["ghk-cu"])
            .with_purposes(["repair", "anti-aging"])
            .with_ph(tenths(55), tenths(70)),
        Ingredient::new("zinc-oxide", "Zinc Oxide", Category::Sunscreen)
            .with_inci("Zinc Oxide")
            .with_purposes(["uv protection"])
            .with_comedogenic_rating(1)
            .suited_for([Sensitive, AcneProne]),
        Ingredient::new("centella-asiatica", "Centella Asiatica", Category::Botanical)
            .with_inci("Centella Asiatica Extract")
            .with_aliases(["cica", "madecassoside", "asiaticoside"])
            .with_purposes(["soothing", "repair"])
            .suited_for([Sensitive]),
        Ingredient::new("fragrance", "Fragrance", Category::Fragrance)
            .with_inci("Parfum")
            .with_aliases(["perfume", "aroma"])
            .with_irritation(Irritation::High)
            .avoid_for([Sensitive]),
        Ingredient::new("water", "Water", Category::Solvent)
            .with_inci("Aqua")
            .with_aliases(["eau"]),
    ]
}

fn rules() -> Vec<ConflictRule> {
    vec![
        ConflictRule::new(
            "retinol",
            "benzoyl-peroxide",
            Severity::Dangerous,
            "Benzoyl peroxide oxidizes and deactivates retinol, and together they sharply raise irritation",
            "Use benzoyl peroxide in the morning and retinol in the evening, or alternate nights",
        )
        .morning_evening("benzoyl-peroxide", "retinol")
        .alternating()
        .with_alternatives(["azelaic-acid"]),
        ConflictRule::new(
            "tretinoin",
            "benzoyl-peroxide",
            Severity::Dangerous,
            "Benzoyl peroxide degrades tretinoin on contact",
            "Use benzoyl peroxide in the morning and tretinoin in the evening; never layer them",
        )
        .morning_evening("benzoyl-peroxide", "tretinoin")
        .alternating()
        .with_alternatives(["adapalene"]),
        ConflictRule::new(
            "retinal",
            "benzoyl-peroxide",
            Severity::Dangerous,
            "Benzoyl peroxide oxidizes retinal and the pairing is highly irritating",
            "Use benzoyl peroxide in the morning and retinal in the evening",
        )
        .morning_evening("benzoyl-peroxide", "retinal")
        .alternating(),
        ConflictRule::new(
            "retinol",
            "tretinoin",
            Severity::High,
            "Stacking two retinoids multiplies irritation without extra benefit",
            "Use only one retinoid in your routine",
        ),
        ConflictRule::new(
            "retinol",
            "glycolic-acid",
            Severity::High,
            "An AHA and a retinoid together over-exfoliate and compromise the skin barrier",
            "Alternate nights: glycolic acid one evening, retinol the next",
        )
        .alternating()
        .with_alternatives(["mandelic-acid"]),
        ConflictRule::new(
            "retinol",
            "lactic-acid",
            Severity::High,
            "An AHA and a retinoid together over-exfoliate and compromise the skin barrier",
            "Alternate nights: lactic acid one evening, retinol the next",
        )
        .alternating(),
        ConflictRule::new(
            "retinol",
            "salicylic-acid",
            Severity::High,
            "BHA plus a retinoid dries and irritates the skin",
            "Use salicylic acid in the morning or on nights you skip retinol",
        )
        .morning_evening("salicylic-acid", "retinol")
        .alternating(),
        ConflictRule::new(
            "tretinoin",
            "glycolic-acid",
            Severity::High,
            "Prescription retinoid plus AHA causes significant barrier damage",
            "Do not use glycolic acid on tretinoin nights; ask your prescriber about alternating",
        )
        .alternating(),
        ConflictRule::new(
            "tretinoin",
            "salicylic-acid",
            Severity::High,
            "Prescription retinoid plus BHA causes excessive dryness and peeling",
            "Keep salicylic acid to mornings or nights without tretinoin",
        )
        .alternating(),
        ConflictRule::new(
            "vitamin-c",
            "benzoyl-peroxide",
            Severity::High,
            "Benzoyl peroxide oxidizes ascorbic acid, cancelling its effect",
            "Apply vitamin C in the morning and benzoyl peroxide in the evening, or on alternate days",
        )
        .morning_evening("vitamin-c", "benzoyl-peroxide")
        .alternating(),
        ConflictRule::new(
            "retinol",
            "vitamin-c",
            Severity::Medium,
            "Vitamin C needs a low pH while retinol works near neutral; layering both increases irritation",
            "Use vitamin C in the morning and retinol in the evening",
        )
        .morning_evening("vitamin-c", "retinol")
        .with_time_gap(30),
        ConflictRule::new(
            "glycolic-acid",
            "salicylic-acid",
            Severity::Medium,
            "Two exfoliating acids at once risk over-exfoliation",
            "Use one exfoliating acid per day, or alternate them",
        )
        .alternating(),
        ConflictRule::new(
            "vitamin-c",
            "glycolic-acid",
            Severity::Medium,
            "Both are low-pH actives; combined they often sting and redden the skin",
            "Use vitamin C in the morning and glycolic acid in the evening",
        )
        .morning_evening("vitamin-c", "glycolic-acid"),
        ConflictRule::new(
            "copper-peptides",
            "vitamin-c",
            Severity::Medium,
            "Copper ions oxidize ascorbic acid and both lose effectiveness",
            "Use vitamin C in the morning and copper peptides in the evening",
        )
        .morning_evening("vitamin-c", "copper-peptides"),
        ConflictRule::new(
            "copper-peptides",
            "glycolic-acid",
            Severity::Medium,
            "Low-pH acids break down copper peptide complexes",
            "Apply copper peptides on evenings you do not exfoliate",
        )
        .alternating(),
        ConflictRule::new(
            "hydroquinone",
            "benzoyl-peroxide",
            Severity::Medium,
            "The combination can temporarily stain the skin dark",
            "Use hydroquinone and benzoyl peroxide at different times of day",
        )
        .morning_evening("benzoyl-peroxide", "hydroquinone"),
        ConflictRule::new(
            "vitamin-c",
            "niacinamide",
            Severity::Low,
            "At high concentrations the pair can cause temporary flushing",
            "Most people can layer them; if flushing occurs, wait 10 minutes between the two",
        )
        .with_time_gap(10),
    ]
}

fn keyword_tables(builder: KnowledgeBaseBuilder) -> KnowledgeBaseBuilder {
    use SkinType::*;

    builder
        .caution(Oily, "coconut oil", "Coconut oil is highly comedogenic and can clog oily skin")
        .caution(Oily, "isopropyl myristate", "Isopropyl myristate is known to clog pores")
        .caution(Oily, "mineral oil", "Heavy mineral oil may feel greasy on oily skin")
        .caution(AcneProne, "coconut oil", "Coconut oil can trigger breakouts")
        .caution(AcneProne, "isopropyl myristate", "Isopropyl myristate can trigger breakouts")
        .caution(AcneProne, "lanolin", "Lanolin may clog pores on acne-prone skin")
        .caution(AcneProne, "algae extract", "Algae extracts are often comedogenic")
        .caution(Dry, "alcohol denat", "Denatured alcohol strips moisture from dry skin")
        .caution(Dry, "sodium lauryl sulfate", "Sulfate cleansers can over-dry the skin")
        .caution(Dry, "benzoyl peroxide", "Benzoyl peroxide is very drying")
        .caution(Dry, "salicylic acid", "Salicylic acid can worsen dryness; use sparingly")
        .caution(Sensitive, "fragrance", "Fragrance is a common irritant for sensitive skin")
        .caution(Sensitive, "parfum", "Fragrance is a common irritant for sensitive skin")
        .caution(Sensitive, "essential oil", "Essential oils frequently irritate sensitive skin")
        .caution(Sensitive, "alcohol denat", "Denatured alcohol can sting sensitive skin")
        .caution(Sensitive, "menthol", "Menthol can sting reactive skin")
        .caution(Sensitive, "glycolic acid", "Glycolic acid penetrates fast; patch test first")
        .caution(Sensitive, "retinol", "Start retinol slowly, twice a week, on sensitive skin")
        .caution(Combination, "coconut oil", "Coconut oil may congest the T-zone")
        .caution(Combination, "alcohol denat", "Denatured alcohol can dry out the cheeks")
        .benefit(Oily, "niacinamide", "Niacinamide helps regulate sebum production")
        .benefit(Oily, "salicylic acid", "Salicylic acid keeps pores clear")
        .benefit(Oily, "zinc", "Zinc helps control shine")
        .benefit(Dry, "hyaluronic acid", "Hyaluronic acid draws moisture into the skin")
        .benefit(Dry, "ceramide", "Ceramides rebuild the moisture barrier")
        .benefit(Dry, "glycerin", "Glycerin is a reliable humectant")
        .benefit(Dry, "squalane", "Squalane replenishes lipids without heaviness")
        .benefit(Dry, "shea butter", "Shea butter seals in moisture")
        .benefit(Sensitive, "centella", "Centella asiatica calms irritation")
        .benefit(Sensitive, "panthenol", "Panthenol soothes and supports repair")
        .benefit(Sensitive, "allantoin", "Allantoin soothes reactive skin")
        .benefit(Sensitive, "oat", "Colloidal oat relieves itching and redness")
        .benefit(Combination, "niacinamide", "Niacinamide balances oily and dry zones")
        .benefit(Combination, "hyaluronic acid", "Hyaluronic acid hydrates without oiliness")
        .benefit(Normal, "vitamin c", "Vitamin C keeps the complexion bright")
        .benefit(Normal, "hyaluronic acid", "Hyaluronic acid maintains hydration")
        .benefit(AcneProne, "salicylic acid", "Salicylic acid unclogs pores")
        .benefit(AcneProne, "benzoyl peroxide", "Benzoyl peroxide kills acne-causing bacteria")
        .benefit(AcneProne, "azelaic acid", "Azelaic acid reduces breakouts and marks")
        .benefit(AcneProne, "niacinamide", "Niacinamide calms inflamed blemishes")
        .concern_note("acne", "salicylic acid", "Targets acne: salicylic acid exfoliates inside pores")
        .concern_note("acne", "benzoyl peroxide", "Targets acne: benzoyl peroxide is antibacterial")
        .concern_note("acne", "azelaic acid", "Targets acne: azelaic acid reduces inflammation")
        .concern_note("acne", "adapalene", "Targets acne: adapalene normalizes cell turnover")
        .concern_note("aging", "retinol", "Targets aging: retinol boosts collagen renewal")
        .concern_note("aging", "peptide", "Targets aging: peptides support firmness")
        .concern_note("aging", "vitamin c", "Targets aging: vitamin C supports collagen")
        .concern_note("wrinkles", "retinol", "Targets wrinkles: retinol smooths fine lines")
        .concern_note("wrinkles", "peptide", "Targets wrinkles: peptides support firmness")
        .concern_note("hyperpigmentation", "vitamin c", "Targets dark spots: vitamin C brightens")
        .concern_note("hyperpigmentation", "niacinamide", "Targets dark spots: niacinamide evens tone")
        .concern_note("hyperpigmentation", "azelaic acid", "Targets dark spots: azelaic acid fades marks")
        .concern_note("hyperpigmentation", "alpha arbutin", "Targets dark spots: alpha arbutin inhibits melanin")
        .concern_note("hyperpigmentation", "tranexamic acid", "Targets dark spots: tranexamic acid fades discoloration")
        .concern_note("dark spots", "vitamin c", "Targets dark spots: vitamin C brightens")
        .concern_note("dark spots", "niacinamide", "Targets dark spots: niacinamide evens tone")
        .concern_note("dryness", "hyaluronic acid", "Targets dryness: hyaluronic acid hydrates")
        .concern_note("dryness", "ceramide", "Targets dryness: ceramides restore the barrier")
        .concern_note("dryness", "glycerin", "Targets dryness: glycerin attracts water")
        .concern_note("redness", "centella", "Targets redness: centella calms the skin")
        .concern_note("redness", "niacinamide", "Targets redness: niacinamide strengthens the barrier")
        .concern_note("redness", "azelaic acid", "Targets redness: azelaic acid reduces flushing")
        .concern_note("dullness", "vitamin c", "Targets dullness: vitamin C adds radiance")
        .concern_note("dullness", "glycolic acid", "Targets dullness: glycolic acid resurfaces")
        .concern_note("dullness", "lactic acid", "Targets dullness: lactic acid gently exfoliates")
        .concern_note("pores", "niacinamide", "Targets pores: niacinamide refines their look")
        .concern_note("pores", "salicylic acid", "Targets pores: salicylic acid clears congestion")
}
