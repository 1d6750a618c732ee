pub struct MatchCollector<'a> {
    max: usize,
    matches: &'a mut Vec<super::Match>,
}

impl<'a> MatchCollector<'a> {
    pub fn new(matches: &mut Vec<super::Match>, max: usize) -> MatchCollector {
        assert!(max > 0, "Expected a positive number for the maximum number of matches.");
        assert!(matches.len() == 0, "The pre-existing matches vector must be empty.");
        MatchCollector {
            max: max,
            matches: matches,
        }
    }

    /// Cost a new match has to beat to get in; None while there is still room.
    pub fn worst_kept(&self) -> Option<i64> {
        if self.matches.len() < self.max {
            return None;
        }
        self.matches.last().map(|x| x.cost)
    }

    pub fn file_match(&mut self, mc: super::Match) {
        // Already at limit: don't bother unless new match is strictly cheaper than the worst one
        if let Some(worst) = self.worst_kept() {
            if mc.cost >= worst {
                return;
            }
        }
        // Where does new match go? (Keep array sorted cheapest to costliest.)
        // Equal costs keep the earlier match in front.
        let ix = self.matches.iter().position(|x| x.cost > mc.cost);
        match ix {
            Some(ix) => self.matches.insert(ix, mc),
            None => self.matches.push(mc),
        }
        // Beyond limit? Drop last item.
        if self.matches.len() > self.max {
            self.matches.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::*;

    #[test]
    #[should_panic]
    fn test_new_fail1() {
        let mut matches: Vec<Match> = Vec::new();
        let mut _collector = MatchCollector::new(&mut matches, 0);
    }

    #[test]
    #[should_panic]
    fn test_new_fail2() {
        let mut matches: Vec<Match> = Vec::new();
        matches.push(Match {
            character: '我',
            cost: 10,
        });
        let mut _collector = MatchCollector::new(&mut matches, 1);
    }

    #[test]
    fn test_filing() {
        let mut matches: Vec<Match> = Vec::new();
        let mut collector = MatchCollector::new(&mut matches, 3);
        let mc1 = Match {
            character: '我',
            cost: 80,
        };
        let mc2 = Match {
            character: '你',
            cost: 90,
        };
        let mc3 = Match {
            character: '他',
            cost: 70,
        };
        let mc4 = Match {
            character: '她',
            cost: 80,
        };
        let mc5 = Match {
            character: '鸡',
            cost: 100,
        };
        collector.file_match(mc1);
        collector.file_match(mc2);
        collector.file_match(mc3);
        assert_eq!(collector.worst_kept(), Some(90));
        collector.file_match(mc4);
        collector.file_match(mc5);
        assert_eq!(matches, [mc3, mc1, mc4]);
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let mut matches: Vec<Match> = Vec::new();
        let mut collector = MatchCollector::new(&mut matches, 2);
        let first = Match {
            character: '一',
            cost: 50,
        };
        let second = Match {
            character: '二',
            cost: 50,
        };
        let third = Match {
            character: '三',
            cost: 50,
        };
        collector.file_match(first);
        collector.file_match(second);
        assert_eq!(collector.worst_kept(), Some(50));
        // Full, and not strictly better than the worst: rejected
        collector.file_match(third);
        assert_eq!(matches, [first, second]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut matches: Vec<Match> = Vec::new();
        let mut collector = MatchCollector::new(&mut matches, 4);
        let mc = Match {
            character: '?',
            cost: 5,
        };
        collector.file_match(mc);
        collector.file_match(mc);
        assert_eq!(collector.worst_kept(), None);
        assert_eq!(matches.len(), 2);
    }
}
