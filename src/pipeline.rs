//! Whole-program driver: index, constrain, link, then solve and repair until
//! nothing changes.

use ptrsafe_ast::TranslationUnit;
use ptrsafe_infer::{
    Assignment, BuildStats, ConstraintBuilder, InferOptions, LinkStats, ProgramInfo,
};
use ptrsafe_solver::Environment;
use tracing::{debug, debug_span, warn};

/// Result of one [`Pipeline::run`].
#[derive(Debug)]
pub struct Outcome {
    pub env: Environment,
    pub assignment: Assignment,
    /// Solve/repair rounds performed, counting the final solve.
    pub rounds: u32,
    /// False when the round bound was hit while repair still reported changes.
    pub converged: bool,
    pub link: LinkStats,
    pub build: BuildStats,
}

pub struct Pipeline {
    info: ProgramInfo,
}

impl Pipeline {
    pub fn new(options: InferOptions) -> Self {
        Pipeline {
            info: ProgramInfo::new(options),
        }
    }

    /// The session, for inspecting variables after a run.
    pub fn info(&self) -> &ProgramInfo {
        &self.info
    }

    pub fn into_info(self) -> ProgramInfo {
        self.info
    }

    /// Analyze every unit together.
    ///
    /// Units may share headers; declarators located in a shared file are
    /// indexed once and reused by every later unit.
    pub fn run(&mut self, units: &[TranslationUnit]) -> Outcome {
        let _span = debug_span!("pipeline", units = units.len()).entered();

        for unit in units {
            self.add_variables(unit);
        }

        let mut build = BuildStats::default();
        for unit in units {
            self.info.enter_compilation_unit(unit);
            let stats = ConstraintBuilder::new(&mut self.info, unit).build();
            self.info.exit_compilation_unit();
            build.functions += stats.functions;
            build.statements += stats.statements;
            build.skipped += stats.skipped;
        }

        let link = self.info.link();
        debug!(
            shared_anchors = link.shared_anchors,
            merged = link.merged_declarations,
            unresolved = link.unresolved_externs,
            atoms = self.info.constraints().num_vars(),
            constraints = self.info.constraints().num_constraints(),
            "linked"
        );

        let bound = self.info.options().max_repair_iterations.max(1);
        let mut rounds = 0;
        let mut converged = false;
        let mut env = self.info.solve();
        while rounds < bound {
            rounds += 1;
            if !self.info.handle_function_subtyping(&env) {
                converged = true;
                break;
            }
            env = self.info.solve();
        }
        if !converged {
            warn!(rounds, "repair still changing at the round bound");
        }

        let assignment = self.info.assignment(&env);
        debug!(
            rounds,
            ptr = assignment.counts.ptr,
            arr = assignment.counts.arr,
            nt_arr = assignment.counts.nt_arr,
            wild = assignment.counts.wild,
            "solved"
        );
        Outcome {
            env,
            assignment,
            rounds,
            converged,
            link,
            build,
        }
    }

    /// Pass 1 for one unit.
    fn add_variables(&mut self, unit: &TranslationUnit) {
        self.info.enter_compilation_unit(unit);
        let mut added = 0usize;
        for decl in unit.declarators() {
            if self.info.add_variable(unit, decl) {
                added += 1;
            }
            if unit.decl(decl).is_function() {
                self.info.see_function_decl(unit, decl);
            }
        }
        debug!(file = %unit.file, added, "indexed unit");
        self.info.exit_compilation_unit();
    }
}
